//! Async logging example
//!
//! Demonstrates non-blocking producers on several threads, a blocking call
//! as an ordering barrier, delivery suspension and metrics.
//!
//! Run with: cargo run --example async_logging

use rust_fanout_logger::prelude::*;
use rust_fanout_logger::scope;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    println!("=== Rust Fanout Logger - Async Logging Example ===\n");

    let logger = Logger::builder()
        .queue_capacity(1000)
        .destination(ConsoleDestination::stdout(
            Flags::TIME | Flags::MICRO | Flags::LAST_PREFIX | Flags::LEVEL | Flags::NEWLINE,
        ))
        .on_failure(Arc::new(|name, err| {
            eprintln!("ALERT: destination {} failed: {}", name, err);
        }))
        .build()?;

    println!("1. Four producer threads:");
    let start = Instant::now();
    let handles: Vec<_> = (0..4)
        .map(|id| {
            let worker = logger.add_prefix([format!("worker-{}", id)]);
            thread::spawn(move || -> Result<()> {
                for i in 0..5 {
                    worker.info(format!("step {}", i))?;
                }
                Ok(())
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer thread panicked")?;
    }
    println!("   enqueued in {:?}", start.elapsed());

    // A blocking call returns only after everything queued before it
    logger.blocking().info("all producers finished")?;

    println!("\n2. Suspending delivery:");
    {
        let _paused = logger.lock();
        logger.warn("queued while paused")?;
        thread::sleep(Duration::from_millis(100));
        println!("   (nothing printed while paused)");
    }
    logger.blocking().info("resumed")?;

    println!("\n3. Scoped logger for code without a logger parameter:");
    scope::with_logger(logger.add_prefix(["scoped"]), || {
        scope::info("found through the thread scope")
    })?;
    logger.blocking().info("scope done")?;

    let metrics = logger.metrics();
    println!("\n4. Metrics:");
    println!("   dispatched:        {}", metrics.records_dispatched());
    println!("   queue full events: {}", metrics.queue_full_events());
    println!("   failure rate:      {:.2}%", metrics.failure_rate());

    logger.close()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
