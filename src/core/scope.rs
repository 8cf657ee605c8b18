//! Thread-local scoped logger
//!
//! Code that cannot thread a [`Logger`] through its call chain can install
//! one for the current thread with [`enter`] and fetch it with [`current`].
//! Scopes nest; dropping a [`ScopeGuard`] restores the logger that was
//! current before it.

use super::{error::Result, log_level::LogLevel, logger::Logger};
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static SCOPE: RefCell<Vec<Logger>> = const { RefCell::new(Vec::new()) };
}

/// RAII guard for a scoped logger
///
/// Not `Send`: it must be dropped on the thread whose scope it pushed.
///
/// # Example
///
/// ```
/// use rust_fanout_logger::{scope, Logger};
///
/// let logger = Logger::new().unwrap().add_prefix(["job"]);
/// {
///     let _guard = scope::enter(logger.clone());
///     assert!(scope::current().is_some());
///     scope::info("inside the job").unwrap();
/// }
/// assert!(scope::current().is_none());
/// ```
#[must_use = "the scope ends when the guard is dropped"]
pub struct ScopeGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPE.with(|scope| {
            let mut scope = scope.borrow_mut();
            // Guards dropped out of order also drop the scopes nested inside them
            scope.truncate(self.depth - 1);
        });
    }
}

/// Make `logger` current on this thread until the guard is dropped
pub fn enter(logger: Logger) -> ScopeGuard {
    let depth = SCOPE.with(|scope| {
        let mut scope = scope.borrow_mut();
        scope.push(logger);
        scope.len()
    });
    ScopeGuard {
        depth,
        _not_send: PhantomData,
    }
}

/// Run `f` with `logger` current on this thread
pub fn with_logger<R>(logger: Logger, f: impl FnOnce() -> R) -> R {
    let _guard = enter(logger);
    f()
}

/// Innermost scoped logger of this thread
pub fn current() -> Option<Logger> {
    SCOPE.with(|scope| scope.borrow().last().cloned())
}

/// Make a logger derived from the current one current.
///
/// Returns `None` and leaves the scope unchanged when no logger is current.
pub fn enter_derived(derive: impl FnOnce(&Logger) -> Logger) -> Option<ScopeGuard> {
    current().map(|logger| enter(derive(&logger)))
}

/// Log through the current logger; a no-op when there is none
pub fn log(level: LogLevel, message: impl Into<String>) -> Result<()> {
    match current() {
        Some(logger) => logger.log(level, message),
        None => Ok(()),
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_scope_is_noop() {
        assert!(current().is_none());
        assert!(info("nobody listens").is_ok());
        assert!(enter_derived(|l| l.blocking()).is_none());
    }

    #[test]
    fn test_nested_scopes_restore() {
        let root = Logger::new().unwrap();
        let outer = enter(root.add_prefix(["outer"]));
        assert_eq!(current().unwrap().prefixes(), ["outer"]);

        {
            let _inner = enter_derived(|l| l.add_prefix(["inner"])).unwrap();
            assert_eq!(current().unwrap().prefixes(), ["outer", "inner"]);
        }
        assert_eq!(current().unwrap().prefixes(), ["outer"]);

        drop(outer);
        assert!(current().is_none());
    }

    #[test]
    fn test_with_logger_returns_value() {
        let logger = Logger::new().unwrap().with_field("k", 1);
        let len = with_logger(logger, || current().map(|l| l.fields().len()));
        assert_eq!(len, Some(1));
        assert!(current().is_none());
    }

    #[test]
    fn test_scope_is_per_thread() {
        let _guard = enter(Logger::new().unwrap());
        let seen = std::thread::spawn(|| current().is_some()).join().unwrap();
        assert!(!seen);
        assert!(current().is_some());
    }

    #[test]
    fn test_out_of_order_drop_truncates() {
        let root = Logger::new().unwrap();
        let outer = enter(root.clone());
        let inner = enter(root.add_prefix(["x"]));
        drop(outer);
        assert!(current().is_none());
        drop(inner);
        assert!(current().is_none());
    }
}
