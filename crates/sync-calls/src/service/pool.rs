//! Slot pool: allocation, free-list, reply routing and pool-wide signaling.
//!
//! The slot table is append-only. An identifier maps to the same slot for the
//! pool's lifetime, so a late reply can always be checked against the slot's
//! current occupancy instead of racing with slot destruction.

use crate::domain::slot::{RetireError, SlotCell};
use crate::domain::{CallHandle, SlotPoolConfig};
use crate::error::ConfigError;
use crate::metrics::{MetricsRecorder, PoolMetrics};
use crate::ports::{ConnectionLifecycle, ReplyRouter, RouteResult};
use crate::service::CallSlot;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

struct PoolInner<M> {
    /// Indexed by identifier. Never shrinks.
    slots: Vec<Arc<SlotCell<M>>>,
    /// Identifiers available for reacquisition, bounded by `max_free_slots`.
    free: Vec<u32>,
}

/// Pool of call slots correlating outbound requests with inbound replies.
///
/// Flow:
/// 1. Caller calls [`acquire`](Self::acquire) and embeds
///    [`CallSlot::handle`] in its request
/// 2. Transport receive thread calls [`route`](Self::route) with the reply
/// 3. Caller's [`CallSlot::get_message`] wakes with the reply
/// 4. Caller drops (or [`release`](CallSlot::release)s) the slot
pub struct SlotPool<M> {
    inner: Mutex<PoolInner<M>>,
    config: SlotPoolConfig,
    metrics: PoolMetrics,
    recorder: Option<Arc<dyn MetricsRecorder>>,
}

impl<M> SlotPool<M> {
    /// Create a pool with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(SlotPoolConfig::default())
    }

    /// Create a pool with the given configuration.
    ///
    /// # Errors
    ///
    /// Any error from [`SlotPoolConfig::validate`].
    pub fn with_config(config: SlotPoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SlotPoolConfig) -> Self {
        Self {
            inner: Mutex::new(PoolInner {
                slots: Vec::new(),
                free: Vec::with_capacity(config.max_free_slots),
            }),
            config,
            metrics: PoolMetrics::new(),
            recorder: None,
        }
    }

    /// Forward pool events to an external recorder as well.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn MetricsRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Lease a slot for one outstanding call.
    ///
    /// Reuses a free slot when one is available, otherwise grows the table.
    /// The returned slot has a fresh sequence, no pending message and an
    /// unsignaled semaphore.
    ///
    /// # Panics
    ///
    /// If the table already holds 2^32 slots. Running out of identifiers is
    /// resource exhaustion and is not recoverable.
    pub fn acquire(&self) -> CallSlot<'_, M> {
        let (cell, sequence, created) = {
            let mut inner = self.inner.lock();
            let (cell, created) = match inner.free.pop() {
                Some(identifier) => (Arc::clone(&inner.slots[identifier as usize]), false),
                None => {
                    let Ok(identifier) = u32::try_from(inner.slots.len()) else {
                        panic!("call slot identifiers exhausted");
                    };
                    let cell = Arc::new(SlotCell::new(identifier));
                    inner.slots.push(Arc::clone(&cell));
                    (cell, true)
                }
            };
            let sequence = cell.rearm();
            (cell, sequence, created)
        };

        self.record(|r| r.record_acquire(created));
        trace!(
            identifier = cell.identifier(),
            sequence,
            created,
            "Acquired call slot"
        );

        CallSlot::new(self, cell, sequence)
    }

    /// Deliver a reply to the slot named by `handle`.
    ///
    /// The allocation lock is held only for the identifier lookup. The
    /// occupancy check, store and signal happen under the slot's own lock, so
    /// routes to different slots do not serialize on each other.
    pub fn route(&self, handle: CallHandle, message: M) -> RouteResult {
        let cell = self.slot(handle.identifier());
        let matched = match cell {
            Some(cell) => cell.deliver(handle.sequence(), message),
            None => false,
        };

        self.record(|r| r.record_delivery(matched));
        if matched {
            debug!(handle = %handle, "Delivered reply to call slot");
            RouteResult::Delivered
        } else {
            debug!(handle = %handle, "Dropped stale reply");
            RouteResult::Stale
        }
    }

    /// Wake every blocked waiter with no message.
    ///
    /// Used when the connection is lost: each waiter sees
    /// [`WaitOutcome::ForcedWake`](crate::WaitOutcome::ForcedWake). Slots
    /// that are not currently waited on keep the signal until their next
    /// wait, acquire or [`clear_all_semaphores`](Self::clear_all_semaphores).
    pub fn signal_all_semaphores(&self) -> usize {
        let cells = self.snapshot();
        for cell in &cells {
            cell.force_signal();
        }
        info!(slots = cells.len(), "Signaled all call slots");
        cells.len()
    }

    /// Reset every semaphore without waking anyone.
    pub fn clear_all_semaphores(&self) -> usize {
        let cells = self.snapshot();
        for cell in &cells {
            cell.clear_signal();
        }
        info!(slots = cells.len(), "Cleared all call slot signals");
        cells.len()
    }

    /// End a lease. Called exactly once per lease by [`CallSlot`].
    pub(crate) fn return_to_pool(&self, cell: &SlotCell<M>, sequence: u32) {
        let identifier = cell.identifier();
        let forfeited = match cell.retire(sequence) {
            Ok(forfeited) => forfeited,
            Err(err) => {
                contract_violation(identifier, sequence, err);
                return;
            }
        };

        let retained = {
            let mut inner = self.inner.lock();
            if inner.free.len() < self.config.max_free_slots {
                inner.free.push(identifier);
                true
            } else {
                false
            }
        };

        self.record(|r| r.record_release(forfeited));
        if forfeited {
            debug!(identifier, sequence, "Released call slot with unread reply");
        }
        trace!(identifier, sequence, retained, "Released call slot");
    }

    pub(crate) fn record_timeout(&self) {
        self.record(|r| r.record_timeout());
    }

    pub(crate) fn record_forced_wake(&self) {
        self.record(|r| r.record_forced_wake());
    }

    /// Number of slot objects ever created.
    pub fn allocated_slots(&self) -> usize {
        self.inner.lock().slots.len()
    }

    /// Number of slots waiting in the free list.
    pub fn free_slots(&self) -> usize {
        self.inner.lock().free.len()
    }

    /// Number of slots currently leased.
    pub fn outstanding(&self) -> usize {
        self.snapshot().iter().filter(|cell| cell.is_leased()).count()
    }

    pub fn config(&self) -> &SlotPoolConfig {
        &self.config
    }

    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }

    fn slot(&self, identifier: u32) -> Option<Arc<SlotCell<M>>> {
        self.inner.lock().slots.get(identifier as usize).map(Arc::clone)
    }

    /// Clone the slot table so per-slot locks are taken after the allocation
    /// lock is released.
    fn snapshot(&self) -> Vec<Arc<SlotCell<M>>> {
        self.inner.lock().slots.clone()
    }

    fn record(&self, event: impl Fn(&dyn MetricsRecorder)) {
        let metrics: &dyn MetricsRecorder = &self.metrics;
        event(metrics);
        if let Some(recorder) = &self.recorder {
            event(recorder.as_ref());
        }
    }
}

fn contract_violation(identifier: u32, sequence: u32, err: RetireError) {
    let current = match err {
        RetireError::NotLeased => None,
        RetireError::SequenceMismatch { current } => Some(current),
    };
    warn!(
        identifier,
        sequence,
        current_sequence = ?current,
        "Release of a call slot the caller does not hold"
    );
    if cfg!(debug_assertions) {
        panic!("call slot {identifier} released outside occupancy {sequence}: {err:?}");
    }
}

impl<M> Default for SlotPool<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send> ReplyRouter<M> for SlotPool<M> {
    fn route(&self, handle: CallHandle, message: M) -> RouteResult {
        SlotPool::route(self, handle, message)
    }
}

impl<M: Send> ConnectionLifecycle for SlotPool<M> {
    fn signal_all(&self) -> usize {
        self.signal_all_semaphores()
    }

    fn clear_all(&self) -> usize {
        self.clear_all_semaphores()
    }
}
