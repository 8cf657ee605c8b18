//! Core logger types and traits

pub mod buffer_pool;
pub mod destination;
pub mod error;
pub mod fields;
pub mod flags;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod manager;
pub mod metrics;
pub mod render;
pub mod scope;

pub use buffer_pool::BufferPool;
pub use destination::{AddCount, Destination, DestinationHandle};
pub use error::{LoggerError, Result};
pub use fields::{Field, FieldValue, Fields};
pub use flags::{FieldStyle, Flags, PrefixMode};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use manager::{
    FailureCallback, Manager, ManagerConfig, ManagerLock, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_WORKER_NAME,
};
pub use metrics::LoggerMetrics;
pub use render::{render, render_cached, render_json, render_text, FormatKind, RenderFn};
