//! Destination trait for log output sinks

use super::{error::Result, flags::Flags, log_entry::LogEntry, log_level::LogLevel, render::FormatKind};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::Arc;

/// A sink records are delivered to.
///
/// Only the manager's worker calls [`deliver`](Destination::deliver), one
/// record at a time. A destination that can be registered more than once
/// counts registrations in [`on_add`](Destination::on_add) and only
/// releases its resource on the close matching the first registration.
pub trait Destination: Send {
    /// Called once per registration with a manager
    fn on_add(&mut self);

    /// Write `entry` if the level threshold permits it.
    ///
    /// Return [`LoggerError::DestinationClosed`](super::LoggerError::DestinationClosed)
    /// to be evicted from the manager. Any other error is counted and
    /// otherwise ignored.
    fn deliver(&mut self, entry: &LogEntry) -> Result<()>;

    fn flags(&self) -> Flags;
    fn set_flags(&mut self, flags: Flags);

    fn level(&self) -> LogLevel;
    fn set_level(&mut self, level: LogLevel);

    fn format_kind(&self) -> FormatKind;

    /// Push buffered bytes to the underlying resource
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Drop one registration; the last one releases the resource.
    ///
    /// May be called before any `on_add` when the destination was never
    /// registered.
    fn close(&mut self) -> Result<()>;

    fn name(&self) -> &str;
}

/// Registration count shared by the concrete destinations
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AddCount(usize);

impl AddCount {
    pub fn increment(&mut self) {
        self.0 += 1;
    }

    /// Consume one close. Returns `true` when this close must release the
    /// underlying resource.
    pub fn release(&mut self) -> bool {
        if self.0 > 1 {
            self.0 -= 1;
            false
        } else {
            self.0 = 0;
            true
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

/// Shared, identity-compared handle to a destination.
///
/// Clones refer to the same sink; registering two clones with a manager is
/// two registrations of one destination.
#[derive(Clone)]
pub struct DestinationHandle(Arc<Mutex<dyn Destination>>);

impl DestinationHandle {
    pub fn new<D: Destination + 'static>(destination: D) -> Self {
        Self(Arc::new(Mutex::new(destination)))
    }

    pub fn lock(&self) -> MutexGuard<'_, dyn Destination> {
        self.0.lock()
    }

    /// Whether both handles point at the same destination
    pub fn ptr_eq(&self, other: &DestinationHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for DestinationHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for DestinationHandle {}

impl fmt::Debug for DestinationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_lock() {
            Some(d) => f
                .debug_struct("DestinationHandle")
                .field("name", &d.name())
                .field("level", &d.level())
                .field("flags", &d.flags())
                .field("format_kind", &d.format_kind())
                .finish(),
            None => f.write_str("DestinationHandle(<locked>)"),
        }
    }
}

impl<D: Destination + 'static> From<D> for DestinationHandle {
    fn from(destination: D) -> Self {
        Self::new(destination)
    }
}
