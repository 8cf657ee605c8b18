//! Dispatch metrics for observability
//!
//! Delivery failures never reach the caller of a log call, so these counters
//! are the way to notice a misbehaving destination.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by a manager and its worker
///
/// # Example
///
/// ```
/// use rust_fanout_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dispatched();
/// metrics.record_delivery_failure();
///
/// assert_eq!(metrics.records_dispatched(), 1);
/// assert_eq!(metrics.delivery_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records the worker finished dispatching
    records_dispatched: AtomicU64,

    /// Deliveries that returned an error other than the closed sentinel
    delivery_failures: AtomicU64,

    /// Deliveries that panicked
    delivery_panics: AtomicU64,

    /// Destinations removed after reporting themselves closed
    destinations_evicted: AtomicU64,

    /// Number of times a producer found the queue full and had to wait
    queue_full_events: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_dispatched: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            delivery_panics: AtomicU64::new(0),
            destinations_evicted: AtomicU64::new(0),
            queue_full_events: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_dispatched(&self) -> u64 {
        self.records_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivery_panics(&self) -> u64 {
        self.delivery_panics.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn destinations_evicted(&self) -> u64 {
        self.destinations_evicted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn queue_full_events(&self) -> u64 {
        self.queue_full_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.records_dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivery_failure(&self) -> u64 {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivery_panic(&self) -> u64 {
        self.delivery_panics.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_evicted(&self, count: u64) -> u64 {
        self.destinations_evicted.fetch_add(count, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_queue_full(&self) -> u64 {
        self.queue_full_events.fetch_add(1, Ordering::Relaxed)
    }

    /// Failed deliveries as a percentage of dispatched records (0.0 - 100.0+).
    ///
    /// One record fanned out to several failing destinations counts once per
    /// failure, so the value can exceed 100.
    pub fn failure_rate(&self) -> f64 {
        let dispatched = self.records_dispatched() as f64;
        if dispatched == 0.0 {
            0.0
        } else {
            (self.delivery_failures() as f64 / dispatched) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.records_dispatched.store(0, Ordering::Relaxed);
        self.delivery_failures.store(0, Ordering::Relaxed);
        self.delivery_panics.store(0, Ordering::Relaxed);
        self.destinations_evicted.store(0, Ordering::Relaxed);
        self.queue_full_events.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            records_dispatched: AtomicU64::new(self.records_dispatched()),
            delivery_failures: AtomicU64::new(self.delivery_failures()),
            delivery_panics: AtomicU64::new(self.delivery_panics()),
            destinations_evicted: AtomicU64::new(self.destinations_evicted()),
            queue_full_events: AtomicU64::new(self.queue_full_events()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.records_dispatched(), 0);
        assert_eq!(metrics.delivery_failures(), 0);
        assert_eq!(metrics.delivery_panics(), 0);
        assert_eq!(metrics.destinations_evicted(), 0);
        assert_eq!(metrics.queue_full_events(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_delivery_failure(), 0);
        assert_eq!(metrics.delivery_failures(), 1);
        assert_eq!(metrics.record_evicted(2), 0);
        assert_eq!(metrics.destinations_evicted(), 2);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..100 {
            metrics.record_dispatched();
        }
        for _ in 0..10 {
            metrics.record_delivery_failure();
        }
        let rate = metrics.failure_rate();
        assert!((9.9..=10.1).contains(&rate), "Failure rate was {}", rate);
    }

    #[test]
    fn test_metrics_reset_and_clone() {
        let metrics = LoggerMetrics::new();
        metrics.record_dispatched();
        metrics.record_queue_full();

        let snapshot = metrics.clone();
        metrics.reset();

        assert_eq!(metrics.records_dispatched(), 0);
        assert_eq!(metrics.queue_full_events(), 0);
        assert_eq!(snapshot.records_dispatched(), 1);
        assert_eq!(snapshot.queue_full_events(), 1);
    }
}
