//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. Each expands to a
//! call on the given logger and evaluates to its `Result`.
//!
//! # Examples
//!
//! ```
//! use rust_fanout_logger::prelude::*;
//! use rust_fanout_logger::info;
//!
//! let logger = Logger::new().unwrap();
//!
//! // Basic logging
//! info!(logger, "Server started").unwrap();
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port).unwrap();
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_fanout_logger::prelude::*;
/// # let logger = Logger::new().unwrap();
/// use rust_fanout_logger::log;
/// log!(logger, LogLevel::Info, "Simple message").unwrap();
/// log!(logger, LogLevel::Error, "Error code: {}", 500).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_fanout_logger::prelude::*;
/// # let logger = Logger::new().unwrap();
/// use rust_fanout_logger::debug;
/// debug!(logger, "Counter value: {}", 10).unwrap();
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_fanout_logger::prelude::*;
/// # let logger = Logger::new().unwrap();
/// use rust_fanout_logger::warn;
/// warn!(logger, "Retry attempt {} of {}", 3, 5).unwrap();
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Deliver a fatal-level message synchronously, then exit with status 1.
///
/// # Examples
///
/// ```no_run
/// # use rust_fanout_logger::prelude::*;
/// # let logger = Logger::new().unwrap();
/// use rust_fanout_logger::fatal;
/// fatal!(logger, "Unrecoverable state: {}", "corrupt index");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(format!($($arg)+))
    };
}
