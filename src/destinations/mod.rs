//! Concrete destinations

pub mod console;
pub mod file;
pub mod writer;

pub use console::{ConsoleDestination, ConsoleTarget};
pub use file::{FileDestination, FileOptions};
pub use writer::{default_close, CloseFn, WriterDestination};
