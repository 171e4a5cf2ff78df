//! Counters for slot pool activity.
//!
//! ## Usage
//!
//! ```
//! use sync_calls::SlotPool;
//!
//! let pool = SlotPool::<String>::new();
//! let slot = pool.acquire();
//! slot.release();
//!
//! let snapshot = pool.metrics().snapshot();
//! assert_eq!(snapshot.acquired, 1);
//! assert_eq!(snapshot.outstanding(), 0);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for one pool.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    /// Leases handed out
    pub acquired: AtomicU64,
    /// Leases returned
    pub released: AtomicU64,
    /// Slot objects created (table growth)
    pub slots_created: AtomicU64,
    /// Replies matched to their occupancy
    pub delivered: AtomicU64,
    /// Replies dropped because their handle no longer matched
    pub stale_dropped: AtomicU64,
    /// Waits that ran out of budget
    pub timeouts: AtomicU64,
    /// Waits ended by a pool-wide signal with no reply
    pub forced_wakes: AtomicU64,
    /// Delivered replies discarded because the lease was released unread
    pub forfeited: AtomicU64,
}

impl PoolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            slots_created: self.slots_created.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            stale_dropped: self.stale_dropped.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            forced_wakes: self.forced_wakes.load(Ordering::Relaxed),
            forfeited: self.forfeited.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        for counter in [
            &self.acquired,
            &self.released,
            &self.slots_created,
            &self.delivered,
            &self.stale_dropped,
            &self.timeouts,
            &self.forced_wakes,
            &self.forfeited,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub acquired: u64,
    pub released: u64,
    pub slots_created: u64,
    pub delivered: u64,
    pub stale_dropped: u64,
    pub timeouts: u64,
    pub forced_wakes: u64,
    pub forfeited: u64,
}

impl MetricsSnapshot {
    /// Leases not yet released at snapshot time.
    pub fn outstanding(&self) -> u64 {
        self.acquired.saturating_sub(self.released)
    }
}

/// Hook for forwarding pool events to an external metrics system.
///
/// The pool always keeps its own [`PoolMetrics`]; a recorder receives the
/// same events in addition.
pub trait MetricsRecorder: Send + Sync {
    fn record_acquire(&self, slot_created: bool);
    fn record_release(&self, forfeited: bool);
    fn record_delivery(&self, matched: bool);
    fn record_timeout(&self);
    fn record_forced_wake(&self);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Debug, Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_acquire(&self, _: bool) {}
    fn record_release(&self, _: bool) {}
    fn record_delivery(&self, _: bool) {}
    fn record_timeout(&self) {}
    fn record_forced_wake(&self) {}
}

impl MetricsRecorder for PoolMetrics {
    fn record_acquire(&self, slot_created: bool) {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        if slot_created {
            self.slots_created.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_release(&self, forfeited: bool) {
        self.released.fetch_add(1, Ordering::Relaxed);
        if forfeited {
            self.forfeited.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_delivery(&self, matched: bool) {
        if matched {
            self.delivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stale_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    fn record_forced_wake(&self) {
        self.forced_wakes.fetch_add(1, Ordering::Relaxed);
    }
}
