//! Process-wide default logger
//!
//! Created on first use: a non-blocking logger with one stdout text
//! destination using [`Flags::STD`]. The free functions here forward to it.
//! Replace it with [`set_default_logger`] to route them elsewhere.

use crate::core::{Flags, LogLevel, Logger, Result};
use crate::destinations::ConsoleDestination;
use parking_lot::RwLock;
use std::sync::OnceLock;

fn slot() -> &'static RwLock<Option<Logger>> {
    static DEFAULT: OnceLock<RwLock<Option<Logger>>> = OnceLock::new();
    DEFAULT.get_or_init(|| RwLock::new(None))
}

fn create_default() -> Result<Logger> {
    Logger::builder()
        .worker_name("fanout-logger-default")
        .destination(ConsoleDestination::stdout(Flags::STD))
        .build()
}

/// The current default logger, created on first use
pub fn default_logger() -> Result<Logger> {
    if let Some(logger) = slot().read().as_ref() {
        return Ok(logger.clone());
    }

    let mut slot = slot().write();
    match slot.as_ref() {
        Some(logger) => Ok(logger.clone()),
        None => {
            let logger = create_default()?;
            *slot = Some(logger.clone());
            Ok(logger)
        }
    }
}

/// Install `logger` as the default; returns the previous one, if any.
///
/// The previous logger's manager stays open while clones of it exist.
pub fn set_default_logger(logger: Logger) -> Option<Logger> {
    slot().write().replace(logger)
}

/// Replace the default logger with one derived from it
///
/// # Example
///
/// ```
/// use rust_fanout_logger::global;
///
/// global::update_default(|l| l.add_prefix(["main"])).unwrap();
/// assert_eq!(global::default_logger().unwrap().prefixes(), ["main"]);
/// ```
pub fn update_default(derive: impl FnOnce(&Logger) -> Logger) -> Result<()> {
    let current = default_logger()?;
    let derived = derive(&current);
    // A concurrent replacement wins over this derivation
    let mut slot = slot().write();
    if slot.as_ref().is_some_and(|l| l.same_lineage(&current)) {
        *slot = Some(derived);
    }
    Ok(())
}

pub fn log(level: LogLevel, message: impl Into<String>) -> Result<()> {
    default_logger()?.log(level, message)
}

pub fn debug(message: impl Into<String>) -> Result<()> {
    log(LogLevel::Debug, message)
}

pub fn info(message: impl Into<String>) -> Result<()> {
    log(LogLevel::Info, message)
}

pub fn warn(message: impl Into<String>) -> Result<()> {
    log(LogLevel::Warn, message)
}

pub fn error(message: impl Into<String>) -> Result<()> {
    log(LogLevel::Error, message)
}
