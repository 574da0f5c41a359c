//! Emitter metrics for observability
//!
//! Counters for monitoring emitter health: delivered records, records
//! filtered by level, sink failures and encoding substitutions.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for emitter observability
///
/// # Example
///
/// ```
/// use log_emitter::EmitterMetrics;
///
/// let metrics = EmitterMetrics::new();
///
/// metrics.record_dropped();
/// metrics.record_logged();
///
/// assert_eq!(metrics.dropped_count(), 1);
/// assert_eq!(metrics.total_logged(), 1);
/// ```
#[derive(Debug)]
pub struct EmitterMetrics {
    /// Records delivered to every sink
    total_logged: AtomicU64,

    /// Records for which at least one sink failed
    dropped_count: AtomicU64,

    /// Individual sink failures (errors and panics)
    sink_failures: AtomicU64,

    /// Calls discarded by the minimum level
    filtered: AtomicU64,

    /// Context values replaced by a placeholder during encoding
    encoding_degradations: AtomicU64,

    /// Calls made after `close()`
    rejected_after_close: AtomicU64,
}

impl EmitterMetrics {
    pub const fn new() -> Self {
        Self {
            total_logged: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            encoding_degradations: AtomicU64::new(0),
            rejected_after_close: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn encoding_degradations(&self) -> u64 {
        self.encoding_degradations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected_after_close(&self) -> u64 {
        self.rejected_after_close.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_degradations(&self, count: usize) -> u64 {
        self.encoding_degradations
            .fetch_add(count as u64, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rejected_after_close(&self) -> u64 {
        self.rejected_after_close.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been emitted.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.total_logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.total_logged.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
        self.encoding_degradations.store(0, Ordering::Relaxed);
        self.rejected_after_close.store(0, Ordering::Relaxed);
    }
}

impl Default for EmitterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EmitterMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            total_logged: AtomicU64::new(self.total_logged()),
            dropped_count: AtomicU64::new(self.dropped_count()),
            sink_failures: AtomicU64::new(self.sink_failures()),
            filtered: AtomicU64::new(self.filtered()),
            encoding_degradations: AtomicU64::new(self.encoding_degradations()),
            rejected_after_close: AtomicU64::new(self.rejected_after_close()),
        }
    }
}
