//! Logger facade
//!
//! A [`Logger`] is an immutable value: a manager reference, the delivery
//! mode, and the prefixes and fields stamped on every record. Deriving a
//! logger (`add_prefix`, `with_field`, `blocking`, ...) returns a new value
//! sharing the same manager, so destinations, queue and close state are
//! common to the whole lineage.

use super::{
    destination::{Destination, DestinationHandle},
    error::Result,
    fields::{FieldValue, Fields},
    flags::Flags,
    log_entry::LogEntry,
    log_level::LogLevel,
    manager::{FailureCallback, Manager, ManagerConfig, ManagerLock},
    metrics::LoggerMetrics,
};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Logger {
    manager: Arc<Manager>,
    blocking: bool,
    prefixes: Arc<[String]>,
    fields: Arc<Fields>,
}

impl Logger {
    /// Non-blocking logger on a fresh manager with no destinations
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_fanout_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .queue_capacity(1024)
    ///     .prefix("api")
    ///     .destination(ConsoleDestination::stdout(Flags::STD))
    ///     .build()
    ///     .unwrap();
    /// logger.info("ready").unwrap();
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Logger bound to an existing manager
    pub fn from_manager(manager: Arc<Manager>) -> Self {
        Self {
            manager,
            blocking: false,
            prefixes: Arc::from(Vec::new()),
            fields: Arc::new(Fields::new()),
        }
    }

    /// Derived logger whose calls return only after every destination has
    /// received the record.
    ///
    /// The first call may wait for records queued earlier by other loggers
    /// of the lineage.
    #[must_use]
    pub fn blocking(&self) -> Self {
        Self {
            blocking: true,
            ..self.clone()
        }
    }

    /// Derived logger whose calls return once the record is queued
    #[must_use]
    pub fn non_blocking(&self) -> Self {
        Self {
            blocking: false,
            ..self.clone()
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Build a record from `message` and hand it to the manager.
    ///
    /// Fails only with [`LoggerError::ManagerClosed`](super::LoggerError::ManagerClosed);
    /// delivery failures are reported through metrics and the failure
    /// callback.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) -> Result<()> {
        let entry = LogEntry::new(level, message)
            .with_prefixes(Arc::clone(&self.prefixes))
            .with_fields(Arc::clone(&self.fields));
        self.manager.log(entry, self.blocking)
    }

    pub fn debug(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Error, message)
    }

    /// Deliver a Fatal record synchronously, then exit the process with
    /// status 1.
    ///
    /// Destinations are not closed; records queued earlier are delivered
    /// first.
    pub fn fatal(&self, message: impl Into<String>) -> ! {
        if let Err(e) = self.blocking().log(LogLevel::Fatal, message) {
            eprintln!("[LOGGER ERROR] Fatal record not delivered: {}", e);
        }
        std::process::exit(1)
    }

    /// Replace all prefixes with `prefix`
    #[must_use]
    pub fn set_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            prefixes: Arc::from(vec![prefix.into()]),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn reset_prefix(&self) -> Self {
        Self {
            prefixes: Arc::from(Vec::new()),
            ..self.clone()
        }
    }

    /// Append prefixes after the existing ones
    #[must_use]
    pub fn add_prefix<I, S>(&self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined: Vec<String> = self
            .prefixes
            .iter()
            .cloned()
            .chain(prefixes.into_iter().map(Into::into))
            .collect();
        Self {
            prefixes: Arc::from(joined),
            ..self.clone()
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    #[must_use]
    pub fn set_fields(&self, fields: Fields) -> Self {
        Self {
            fields: Arc::new(fields),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn reset_fields(&self) -> Self {
        self.set_fields(Fields::new())
    }

    /// Append `fields` after the existing ones; duplicate keys are kept
    #[must_use]
    pub fn add_fields(&self, fields: &Fields) -> Self {
        let mut joined = Fields::clone(&self.fields);
        joined.extend_from(fields);
        self.set_fields(joined)
    }

    #[must_use]
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let mut joined = Fields::clone(&self.fields);
        joined.add(key, value);
        self.set_fields(joined)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Register a destination with the shared manager.
    ///
    /// Affects every logger of the lineage.
    pub fn add_destination(&self, destination: impl Into<DestinationHandle>) -> Result<()> {
        self.manager.add_destination(destination.into())
    }

    pub fn remove_destination(&self, destination: &DestinationHandle) -> bool {
        self.manager.remove_destination(destination)
    }

    pub fn for_each_destination<F>(&self, f: F)
    where
        F: FnMut(usize, &mut dyn Destination),
    {
        self.manager.for_each(f)
    }

    /// Overwrite the level threshold of every registered destination
    pub fn set_level(&self, level: LogLevel) {
        self.for_each_destination(|_, d| d.set_level(level));
    }

    /// Overwrite the flags of every registered destination
    pub fn set_flags(&self, flags: Flags) {
        self.for_each_destination(|_, d| d.set_flags(flags));
    }

    /// Suspend delivery until the returned guard is dropped.
    ///
    /// Records keep queueing; once the queue is full, producers block.
    /// A blocking call made while the guard is held on the same thread
    /// deadlocks.
    pub fn lock(&self) -> ManagerLock<'_> {
        self.manager.lock()
    }

    /// Drain the queue, then close every destination of the lineage.
    ///
    /// Later calls from any logger of the lineage fail with
    /// [`LoggerError::ManagerClosed`](super::LoggerError::ManagerClosed).
    pub fn close(&self) -> Result<()> {
        self.manager.close()
    }

    pub fn is_closed(&self) -> bool {
        self.manager.is_closed()
    }

    pub fn manager(&self) -> &Arc<Manager> {
        &self.manager
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.manager.metrics()
    }

    /// Whether both loggers share one manager
    pub fn same_lineage(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.manager, &other.manager)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("blocking", &self.blocking)
            .field("prefixes", &self.prefixes)
            .field("fields", &self.fields)
            .field("destinations", &self.manager.len())
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_fanout_logger::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .queue_capacity(256)
///     .blocking(true)
///     .field("service", "billing")
///     .destination(ConsoleDestination::stderr(Flags::STD))
///     .on_failure(Arc::new(|name, err| {
///         eprintln!("ALERT: {} failed: {}", name, err);
///     }))
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    config: ManagerConfig,
    blocking: bool,
    prefixes: Vec<String>,
    fields: Fields,
    destinations: Vec<DestinationHandle>,
    on_failure: Option<FailureCallback>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: ManagerConfig::default(),
            blocking: false,
            prefixes: Vec::new(),
            fields: Fields::new(),
            destinations: Vec::new(),
            on_failure: None,
        }
    }

    /// Replace the whole manager configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the bounded queue length; producers block while it is full
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.config.worker_name = name.into();
        self
    }

    /// Make calls wait for delivery. Default is non-blocking.
    #[must_use = "builder methods return a new value"]
    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.add(key, value);
        self
    }

    /// Add a destination
    #[must_use = "builder methods return a new value"]
    pub fn destination(mut self, destination: impl Into<DestinationHandle>) -> Self {
        self.destinations.push(destination.into());
        self
    }

    /// Set a callback invoked with the destination name and error for
    /// every failed delivery
    #[must_use = "builder methods return a new value"]
    pub fn on_failure(mut self, callback: FailureCallback) -> Self {
        self.on_failure = Some(callback);
        self
    }

    /// Start the manager and register the destinations
    pub fn build(self) -> Result<Logger> {
        let manager = Arc::new(Manager::new(self.config, self.on_failure)?);
        for destination in self.destinations {
            manager.add_destination(destination)?;
        }

        Ok(Logger {
            manager,
            blocking: self.blocking,
            prefixes: Arc::from(self.prefixes),
            fields: Arc::new(self.fields),
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
