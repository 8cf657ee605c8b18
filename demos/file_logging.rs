//! File logging example
//!
//! Demonstrates fanning one record out to a text file, a JSON file and the
//! console at once.
//!
//! Run with: cargo run --example file_logging

use rust_fanout_logger::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust Fanout Logger - File Logging Example ===\n");

    let text = FileDestination::with_options(
        "application.log",
        FileOptions {
            level: LogLevel::Debug,
            ..FileOptions::default()
        },
    )?;
    let json = FileDestination::with_options(
        "application.jsonl",
        FileOptions {
            append: false,
            exclusive_lock: cfg!(feature = "file"),
            flags: Flags::TIME
                | Flags::PREFIX
                | Flags::LEVEL
                | Flags::FIELDS_NESTED_OBJECT
                | Flags::NEWLINE,
            format: FormatKind::Json,
            ..FileOptions::default()
        },
    )?;

    let logger = Logger::builder()
        .prefix("billing")
        .destination(text)
        .destination(json)
        .destination(
            ConsoleDestination::stderr(Flags::LEVEL | Flags::NEWLINE).with_level(LogLevel::Error),
        )
        .build()?;

    println!("1. Logging to files (errors also on stderr):");
    let invoice = logger.with_field("invoice", 1042).with_field("amount", 99.5);
    invoice.debug("computing totals")?;
    invoice.info("invoice issued")?;
    invoice.error("payment gateway timeout")?;

    println!("\n2. Closing flushes and releases both files");
    logger.close()?;

    println!("\n   application.log:");
    print!("{}", std::fs::read_to_string("application.log")?);
    println!("\n   application.jsonl:");
    print!("{}", std::fs::read_to_string("application.jsonl")?);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
