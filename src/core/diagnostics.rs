//! Fallback reporting for failures of the emitter itself
//!
//! Sink failures are written to standard error, never back into the
//! emitter's own sinks. Each distinct failure is reported at most once per
//! window so a dead sink cannot flood stderr.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Default window during which a repeated failure is suppressed
pub const DEFAULT_REPORT_WINDOW: Duration = Duration::from_secs(10);

/// Entries older than the window are pruned once the map grows past this
const PRUNE_THRESHOLD: usize = 64;

#[derive(Debug)]
pub struct FailureReporter {
    window: Duration,
    last_reported: Mutex<HashMap<String, Instant>>,
    suppressed: AtomicU64,
    enabled: bool,
}

impl FailureReporter {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_reported: Mutex::new(HashMap::new()),
            suppressed: AtomicU64::new(0),
            enabled: true,
        }
    }

    /// A reporter that tracks and rate-limits but never prints
    #[must_use]
    pub fn silent(window: Duration) -> Self {
        Self {
            enabled: false,
            ..Self::new(window)
        }
    }

    /// Decide whether `key` should be reported now, recording the attempt.
    pub fn should_report(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut last = self.last_reported.lock();

        if last.len() > PRUNE_THRESHOLD {
            let window = self.window;
            last.retain(|_, at| now.duration_since(*at) < window);
        }

        match last.get(key) {
            Some(at) if now.duration_since(*at) < self.window => {
                self.suppressed.fetch_add(1, Ordering::Relaxed);
                false
            }
            _ => {
                last.insert(key.to_string(), now);
                true
            }
        }
    }

    /// Report a failure to stderr unless an identical one was reported
    /// within the window. Returns whether the message was emitted.
    pub fn report(&self, key: &str, message: &str) -> bool {
        if !self.should_report(key) {
            return false;
        }
        if self.enabled {
            eprintln!("[LOGGER ERROR] {}", message);
        }
        true
    }

    /// Number of reports swallowed by rate limiting
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for FailureReporter {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_repeated_failure_reported_once_per_window() {
        let reporter = FailureReporter::silent(Duration::from_secs(60));

        assert!(reporter.report("udp:sink_write", "send failed"));
        assert!(!reporter.report("udp:sink_write", "send failed"));
        assert!(!reporter.report("udp:sink_write", "send failed"));
        assert_eq!(reporter.suppressed_count(), 2);
    }

    #[test]
    fn test_distinct_failures_reported_separately() {
        let reporter = FailureReporter::silent(Duration::from_secs(60));

        assert!(reporter.report("udp:sink_write", "send failed"));
        assert!(reporter.report("file:sink_rotation", "rename failed"));
        assert_eq!(reporter.suppressed_count(), 0);
    }

    #[test]
    fn test_reported_again_after_window() {
        let reporter = FailureReporter::silent(Duration::from_millis(20));

        assert!(reporter.should_report("k"));
        assert!(!reporter.should_report("k"));
        thread::sleep(Duration::from_millis(40));
        assert!(reporter.should_report("k"));
    }

    #[test]
    fn test_prunes_stale_keys() {
        let reporter = FailureReporter::silent(Duration::from_millis(1));
        for i in 0..=PRUNE_THRESHOLD {
            reporter.should_report(&format!("key-{}", i));
        }
        thread::sleep(Duration::from_millis(5));
        reporter.should_report("fresh");

        assert!(reporter.last_reported.lock().len() <= 2);
    }
}
