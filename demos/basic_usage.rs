//! Basic logger usage example
//!
//! Demonstrates blocking logging to the console, level thresholds and
//! prefix/field derivation.
//!
//! Run with: cargo run --example basic_usage

use rust_fanout_logger::prelude::*;
use rust_fanout_logger::{info, warn};

fn main() -> Result<()> {
    println!("=== Rust Fanout Logger - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .blocking(true)
        .destination(
            ConsoleDestination::new(ConsoleTarget::Split, Flags::STD).with_level(LogLevel::Debug),
        )
        .build()?;

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message")?;
    logger.info("This is an info message")?;
    logger.warn("This is a warning message")?;
    logger.error("This is an error message (stderr)")?;

    println!("\n2. Raising the threshold to WARN:");
    logger.set_level(LogLevel::Warn);
    logger.info("Info message (hidden)")?;
    warn!(logger, "Warning message {} (visible)", 2)?;

    println!("\n3. Derived loggers share destinations:");
    logger.set_level(LogLevel::Info);
    let db = logger.add_prefix(["db"]).with_field("pool", "primary");
    info!(db, "connected in {}ms", 12)?;
    db.set_prefix("cache").reset_fields().info("warm")?;

    println!("\n4. Changing flags for every destination:");
    logger.set_flags(Flags::LEVEL | Flags::NEWLINE);
    logger.info("no timestamp any more")?;

    logger.close()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
