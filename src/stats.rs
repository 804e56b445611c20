//! Scheduler counters.

use core::sync::atomic::{AtomicU64, Ordering};

/// Statistics for session scheduling.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    /// Total number of requests accepted by `start_with_device`.
    pub enqueued_count: AtomicU64,
    /// Total number of sessions moved into the active slot.
    pub started_count: AtomicU64,
    /// Total number of sessions that closed without a failure cause.
    pub closed_count: AtomicU64,
    /// Total number of sessions that closed with a failure cause.
    pub failed_count: AtomicU64,
    /// Total number of cleanup steps that reported an error.
    pub cleanup_error_count: AtomicU64,
    /// Total number of device events dropped as stale.
    pub stale_event_count: AtomicU64,
}

impl SchedulerStats {
    /// Creates a new statistics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_enqueued(&self) {
        self.enqueued_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_started(&self) {
        self.started_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_closed(&self, failed: bool) {
        if failed {
            self.failed_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.closed_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_cleanup_errors(&self, count: usize) {
        self.cleanup_error_count
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_stale_event(&self) {
        self.stale_event_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the number of accepted requests.
    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued_count.load(Ordering::Relaxed)
    }

    /// Gets the number of started sessions.
    #[inline]
    pub fn started(&self) -> u64 {
        self.started_count.load(Ordering::Relaxed)
    }

    /// Gets the number of cleanly closed sessions.
    #[inline]
    pub fn closed(&self) -> u64 {
        self.closed_count.load(Ordering::Relaxed)
    }

    /// Gets the number of sessions that ended with a failure.
    #[inline]
    pub fn failed(&self) -> u64 {
        self.failed_count.load(Ordering::Relaxed)
    }

    /// Gets the number of cleanup-step errors.
    #[inline]
    pub fn cleanup_errors(&self) -> u64 {
        self.cleanup_error_count.load(Ordering::Relaxed)
    }

    /// Gets the number of dropped stale events.
    #[inline]
    pub fn stale_events(&self) -> u64 {
        self.stale_event_count.load(Ordering::Relaxed)
    }

    /// Gets the total number of finished sessions (clean + failed).
    #[inline]
    pub fn finished(&self) -> u64 {
        self.closed() + self.failed()
    }
}
