//! # Rust Fanout Logger
//!
//! A structured logging pipeline that routes leveled, prefixed, field-tagged
//! records to any number of destinations, either synchronously or through a
//! dedicated worker thread.
//!
//! ## Features
//!
//! - **Strict Ordering**: One FIFO queue per logger lineage; a blocking call
//!   returns after every earlier record was delivered
//! - **Shared Rendering**: Destinations with the same flags and format reuse
//!   one rendering of each record
//! - **Multiple Destinations**: Console, file, and any `io::Write`
//! - **Immutable Loggers**: Derive prefixed or field-tagged loggers freely

pub mod core;
pub mod destinations;
pub mod global;
pub mod macros;

pub use crate::core::scope;

pub mod prelude {
    pub use crate::core::{
        Destination, DestinationHandle, FieldValue, Fields, Flags, FormatKind, LogEntry,
        LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics, ManagerConfig, Result,
    };
    pub use crate::destinations::{
        ConsoleDestination, ConsoleTarget, FileDestination, FileOptions, WriterDestination,
    };
}

pub use crate::core::{
    BufferPool, Destination, DestinationHandle, FailureCallback, Field, FieldValue, Fields,
    Flags, FormatKind, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
    Manager, ManagerConfig, ManagerLock, Result, DEFAULT_QUEUE_CAPACITY,
};
pub use destinations::{ConsoleDestination, FileDestination, FileOptions, WriterDestination};
