//! Leased call slot.

use crate::domain::slot::SlotCell;
use crate::domain::{CallHandle, WaitOutcome};
use crate::error::CallError;
use crate::service::SlotPool;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// One outstanding call's lease on a pool slot.
///
/// The lease ends when the value is dropped or [`release`](Self::release)d,
/// whichever comes first, so it is returned to the pool exactly once. After
/// that any reply routed with this lease's handle is stale.
///
/// A reply that arrives after [`get_message`](Self::get_message) timed out
/// but before the lease ends is kept: a further `get_message` returns it.
/// Ending the lease discards it.
#[must_use = "dropping a CallSlot releases it immediately"]
pub struct CallSlot<'pool, M> {
    pool: &'pool SlotPool<M>,
    cell: Arc<SlotCell<M>>,
    sequence: u32,
}

impl<'pool, M> CallSlot<'pool, M> {
    pub(crate) fn new(pool: &'pool SlotPool<M>, cell: Arc<SlotCell<M>>, sequence: u32) -> Self {
        Self {
            pool,
            cell,
            sequence,
        }
    }

    /// Handle to embed in the outbound request.
    pub fn handle(&self) -> CallHandle {
        CallHandle::encode(self.cell.identifier(), self.sequence)
    }

    pub fn identifier(&self) -> u32 {
        self.cell.identifier()
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Block for up to `timeout` waiting for the reply.
    pub fn get_message(&self, timeout: Duration) -> WaitOutcome<M> {
        let deadline = Instant::now().checked_add(timeout);
        let outcome = self.cell.wait(self.sequence, deadline);

        match &outcome {
            WaitOutcome::Delivered(_) => {}
            WaitOutcome::TimedOut => self.pool.record_timeout(),
            WaitOutcome::ForcedWake => self.pool.record_forced_wake(),
        }
        trace!(
            handle = %self.handle(),
            delivered = outcome.is_delivered(),
            timed_out = outcome.is_timed_out(),
            "Call slot wait finished"
        );
        outcome
    }

    /// [`get_message`](Self::get_message) with the pool's default timeout.
    pub fn get_message_default(&self) -> WaitOutcome<M> {
        self.get_message(self.pool.config().default_timeout())
    }

    /// Wait for the reply, mapping timeout and forced wake onto [`CallError`].
    pub fn wait_reply(&self, timeout: Duration) -> Result<M, CallError> {
        let started = Instant::now();
        let outcome = self.get_message(timeout);
        outcome.into_result(self.handle(), started.elapsed())
    }

    /// Return the slot to the pool.
    pub fn release(self) {
        drop(self);
    }
}

impl<M> Drop for CallSlot<'_, M> {
    fn drop(&mut self) {
        self.pool.return_to_pool(&self.cell, self.sequence);
    }
}

impl<M> fmt::Debug for CallSlot<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSlot")
            .field("handle", &self.handle())
            .finish_non_exhaustive()
    }
}
