//! Dispatch manager
//!
//! A manager owns the destination registry, a bounded FIFO queue and one
//! worker thread draining it. Producers on any thread enqueue records; only
//! the worker calls into destinations, in arrival order, so a blocking call
//! returns after every record queued before it has been delivered.

use super::{
    destination::{Destination, DestinationHandle},
    error::{LoggerError, Result},
    log_entry::LogEntry,
    metrics::LoggerMetrics,
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

/// Default number of records the queue holds before producers block
pub const DEFAULT_QUEUE_CAPACITY: usize = 128;

/// Default name of the delivery thread
pub const DEFAULT_WORKER_NAME: &str = "fanout-logger-worker";

/// Called by the worker with the destination name and error for every
/// failed delivery or flush. Runs while the registry is locked.
pub type FailureCallback = Arc<dyn Fn(&str, &LoggerError) + Send + Sync>;

/// Manager settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Bounded queue length; a full queue blocks producers
    pub queue_capacity: usize,
    /// Name given to the worker thread
    pub worker_name: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_name: DEFAULT_WORKER_NAME.to_string(),
        }
    }
}

impl ManagerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(LoggerError::config(
                "ManagerConfig",
                "queue_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

/// One queued unit of work. `entry == None` is the drain marker used by
/// [`Manager::close`].
struct WorkItem {
    entry: Option<LogEntry>,
    done: Option<Sender<()>>,
}

/// State shared between the manager and its worker
struct Shared {
    registry: Mutex<Vec<DestinationHandle>>,
    metrics: LoggerMetrics,
    on_failure: Option<FailureCallback>,
}

pub struct Manager {
    shared: Arc<Shared>,
    sender: RwLock<Option<Sender<WorkItem>>>,
    closed: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
    queue_capacity: usize,
}

impl Manager {
    /// Start a manager and its worker thread
    pub fn new(config: ManagerConfig, on_failure: Option<FailureCallback>) -> Result<Self> {
        config.validate()?;

        let (sender, receiver) = bounded(config.queue_capacity);
        let shared = Arc::new(Shared {
            registry: Mutex::new(Vec::new()),
            metrics: LoggerMetrics::new(),
            on_failure,
        });
        let worker_shared = Arc::clone(&shared);

        let handle = thread::Builder::new()
            .name(config.worker_name.clone())
            .spawn(move || worker_shared.run(receiver))
            .map_err(|e| LoggerError::io_operation("spawning worker", config.worker_name, e))?;

        Ok(Self {
            shared,
            sender: RwLock::new(Some(sender)),
            closed: AtomicBool::new(false),
            worker_id: handle.thread().id(),
            worker: Mutex::new(Some(handle)),
            queue_capacity: config.queue_capacity,
        })
    }

    /// Queue `entry` for delivery.
    ///
    /// Blocks while the queue is full. With `blocking`, also waits until the
    /// worker has delivered the entry (and so every entry queued before it)
    /// to all destinations. Fails when the manager is closed, or when a
    /// blocking call comes from a destination running on the worker.
    pub fn log(&self, entry: LogEntry, blocking: bool) -> Result<()> {
        if blocking && thread::current().id() == self.worker_id {
            // The worker would wait on a signal only it can send
            return Err(LoggerError::other(
                "blocking log call from the delivery worker; use a non-blocking logger",
            ));
        }

        let (done, wait) = if blocking {
            let (tx, rx) = bounded(1);
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        self.enqueue(WorkItem {
            entry: Some(entry),
            done,
        })?;

        if let Some(wait) = wait {
            // The worker only drops the signal unsent if it died mid-delivery
            wait.recv().map_err(|_| LoggerError::ManagerClosed)?;
        }
        Ok(())
    }

    fn enqueue(&self, item: WorkItem) -> Result<()> {
        // The read lock is held across the send so close() cannot seal the
        // queue between the closed check and the enqueue.
        let guard = self.sender.read();
        let sender = match guard.as_ref() {
            Some(sender) if !self.closed.load(Ordering::Acquire) => sender,
            _ => return Err(LoggerError::ManagerClosed),
        };

        match sender.try_send(item) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) if thread::current().id() == self.worker_id => {
                self.shared.metrics.record_queue_full();
                Err(LoggerError::other(
                    "queue full on a log call from the delivery worker; record dropped",
                ))
            }
            Err(TrySendError::Full(item)) => {
                self.shared.metrics.record_queue_full();
                sender.send(item).map_err(|_| LoggerError::ManagerClosed)
            }
            Err(TrySendError::Disconnected(_)) => Err(LoggerError::ManagerClosed),
        }
    }

    /// Register a destination and call its `on_add` hook
    pub fn add_destination(&self, destination: DestinationHandle) -> Result<()> {
        if self.is_closed() {
            return Err(LoggerError::ManagerClosed);
        }
        let mut registry = self.shared.registry.lock();
        // close() flips the flag before it takes the registry, so checking
        // again here guarantees the destination is closed with the rest.
        if self.is_closed() {
            return Err(LoggerError::ManagerClosed);
        }
        destination.lock().on_add();
        registry.push(destination);
        Ok(())
    }

    /// Unregister one registration of `destination`.
    ///
    /// The destination is not closed; that stays with the caller.
    pub fn remove_destination(&self, destination: &DestinationHandle) -> bool {
        let mut registry = self.shared.registry.lock();
        match registry.iter().position(|d| d.ptr_eq(destination)) {
            Some(idx) => {
                registry.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Run `f` on every registered destination while holding the registry
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(usize, &mut dyn Destination),
    {
        let registry = self.shared.registry.lock();
        for (idx, handle) in registry.iter().enumerate() {
            let mut destination = handle.lock();
            f(idx, &mut *destination);
        }
    }

    /// Snapshot of the registered handles
    pub fn destinations(&self) -> Vec<DestinationHandle> {
        self.shared.registry.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.shared.registry.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Suspend delivery until the returned guard is dropped.
    ///
    /// Records keep queueing while suspended; once the queue is full,
    /// producers block. Waits for the record currently being delivered.
    pub fn lock(&self) -> ManagerLock<'_> {
        ManagerLock {
            _registry: self.shared.registry.lock(),
        }
    }

    pub fn try_lock(&self) -> Option<ManagerLock<'_>> {
        self.shared
            .registry
            .try_lock()
            .map(|registry| ManagerLock { _registry: registry })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    /// Drain the queue, stop the worker, then close every registration.
    ///
    /// Every record accepted before this call is delivered first. Close
    /// failures are collected into [`LoggerError::CloseFailed`] without
    /// stopping at the first one. A second call fails with
    /// [`LoggerError::ManagerClosed`]. Waits for a held [`ManagerLock`]
    /// to be released; must not be called from a destination.
    pub fn close(&self) -> Result<()> {
        let sender = {
            let mut guard = self.sender.write();
            if self.closed.swap(true, Ordering::AcqRel) {
                return Err(LoggerError::ManagerClosed);
            }
            guard.take()
        };
        let Some(sender) = sender else {
            return Err(LoggerError::ManagerClosed);
        };

        if thread::current().id() == self.worker_id {
            // Called from inside a delivery: the worker exits once the queue
            // empties, but it holds the registry so nothing can be closed here.
            drop(sender);
            return Err(LoggerError::other(
                "log manager closed from its own worker; destinations left open",
            ));
        }

        let (done, wait) = bounded(1);
        let marker = WorkItem {
            entry: None,
            done: Some(done),
        };
        if sender.send(marker).is_ok() {
            let _ = wait.recv();
        }
        drop(sender);

        if let Some(handle) = self.worker.lock().take() {
            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Delivery worker panicked during shutdown: {:?}", e);
            }
        }

        let mut registry = self.shared.registry.lock();
        let mut errors = Vec::new();
        for handle in registry.drain(..) {
            if let Err(e) = handle.lock().close() {
                errors.push(e);
            }
        }
        LoggerError::aggregate(errors)
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to close log manager on drop: {}", e);
        }
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("closed", &self.is_closed())
            .field("queue_capacity", &self.queue_capacity)
            .field("metrics", &self.shared.metrics)
            .finish()
    }
}

/// Guard returned by [`Manager::lock`]; delivery resumes when it drops
#[must_use = "delivery resumes as soon as the guard is dropped"]
pub struct ManagerLock<'a> {
    _registry: MutexGuard<'a, Vec<DestinationHandle>>,
}

impl ManagerLock<'_> {
    /// Resume delivery
    pub fn unlock(self) {}
}

impl Shared {
    fn run(&self, receiver: Receiver<WorkItem>) {
        let mut evict = Vec::new();

        for item in receiver.iter() {
            if let Some(entry) = item.entry {
                let mut registry = self.registry.lock();
                self.dispatch(&mut registry, &entry, &mut evict);
                if item.done.is_some() || receiver.is_empty() {
                    self.flush_all(&registry);
                }
                drop(registry);

                entry.release_compiled();
                self.metrics.record_dispatched();
            }

            if let Some(done) = item.done {
                let _ = done.send(());
            }
        }
    }

    /// Deliver one record to every destination in registration order and
    /// drop those that report themselves closed
    fn dispatch(
        &self,
        registry: &mut Vec<DestinationHandle>,
        entry: &LogEntry,
        evict: &mut Vec<usize>,
    ) {
        evict.clear();

        for (idx, handle) in registry.iter().enumerate() {
            let mut destination = handle.lock();
            let result = panic::catch_unwind(AssertUnwindSafe(|| destination.deliver(entry)));

            match result {
                Ok(Ok(())) => {}
                Ok(Err(LoggerError::DestinationClosed)) => evict.push(idx),
                Ok(Err(e)) => {
                    self.metrics.record_delivery_failure();
                    self.report(destination.name(), &e);
                }
                Err(panic_info) => {
                    self.metrics.record_delivery_panic();
                    eprintln!(
                        "[LOGGER CRITICAL] Destination '{}' panicked: {}. \
                         Other destinations continue to function.",
                        destination.name(),
                        panic_message(&*panic_info)
                    );
                }
            }
        }

        if !evict.is_empty() {
            self.metrics.record_evicted(evict.len() as u64);
            let mut idx = 0;
            registry.retain(|_| {
                let keep = !evict.contains(&idx);
                idx += 1;
                keep
            });
        }
    }

    fn flush_all(&self, registry: &[DestinationHandle]) {
        for handle in registry {
            let mut destination = handle.lock();
            let result = panic::catch_unwind(AssertUnwindSafe(|| destination.flush()));
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.metrics.record_delivery_failure();
                    self.report(destination.name(), &e);
                }
                Err(panic_info) => {
                    self.metrics.record_delivery_panic();
                    eprintln!(
                        "[LOGGER CRITICAL] Destination '{}' panicked during flush: {}.",
                        destination.name(),
                        panic_message(&*panic_info)
                    );
                }
            }
        }
    }

    fn report(&self, name: &str, error: &LoggerError) {
        let Some(ref callback) = self.on_failure else {
            return;
        };
        if let Err(panic_info) = panic::catch_unwind(AssertUnwindSafe(|| callback(name, error))) {
            self.metrics.record_delivery_panic();
            eprintln!(
                "[LOGGER CRITICAL] Failure callback panicked while reporting '{}': {}.",
                name,
                panic_message(&*panic_info)
            );
        }
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
