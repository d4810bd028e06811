//! Shared run counters
//!
//! One `RunMetrics` is owned by exactly one benchmark run. The atomic
//! counters are the only cross-worker shared mutable state; everything
//! else is worker-local. Relaxed ordering is enough because the summary
//! is read only after every worker has been joined.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Atomic counters shared by all workers of a single run
pub struct RunMetrics {
    succeeded: AtomicU64,
    failed: AtomicU64,
    received: AtomicU64,
    started_at: Instant,
}

/// Point-in-time view of the counters, taken once at run completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub succeeded: u64,
    pub failed: u64,
    pub received: u64,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            received: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    #[inline]
    pub fn record_succeeded(&self, count: u64) {
        self.succeeded.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failed(&self, count: u64) {
        self.failed.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Wall time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
        }
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Final counters and wall time of one completed run
#[derive(Debug, Clone, Copy)]
pub struct RunOutcome {
    pub metrics: MetricsSnapshot,
    pub elapsed: Duration,
}

/// messages / second over the elapsed window
pub fn throughput(messages: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        0.0
    } else {
        messages as f64 / secs
    }
}
