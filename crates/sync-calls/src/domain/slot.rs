//! A single call slot: one pending-message cell plus a binary semaphore.
//!
//! Both live under the slot's own mutex, so a reply is either stored and
//! signaled for the occupancy it names or not touched at all. The pool's
//! allocation lock is never held while this lock is taken for waiting.

use crate::domain::WaitOutcome;
use parking_lot::{Condvar, Mutex};
use std::time::Instant;

struct SlotState<M> {
    /// Occupancy counter. Bumped on every acquire; wraps.
    sequence: u32,
    /// Held by a caller.
    leased: bool,
    /// A reply already matched this occupancy.
    answered: bool,
    /// Binary semaphore count.
    signaled: bool,
    message: Option<M>,
}

/// Why a slot refused to be returned to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetireError {
    NotLeased,
    SequenceMismatch { current: u32 },
}

/// Per-identifier slot storage. Created once by the pool and reused for every
/// later occupancy of the same identifier.
pub(crate) struct SlotCell<M> {
    identifier: u32,
    state: Mutex<SlotState<M>>,
    ready: Condvar,
}

impl<M> SlotCell<M> {
    pub(crate) fn new(identifier: u32) -> Self {
        Self {
            identifier,
            state: Mutex::new(SlotState {
                sequence: 0,
                leased: false,
                answered: false,
                signaled: false,
                message: None,
            }),
            ready: Condvar::new(),
        }
    }

    pub(crate) fn identifier(&self) -> u32 {
        self.identifier
    }

    pub(crate) fn is_leased(&self) -> bool {
        self.state.lock().leased
    }

    /// Start a new occupancy and return its sequence. Any residual message or
    /// signal from an earlier occupancy is discarded.
    pub(crate) fn rearm(&self) -> u32 {
        let residual;
        let sequence;
        {
            let mut state = self.state.lock();
            debug_assert!(!state.leased, "slot {} acquired while leased", self.identifier);
            state.sequence = state.sequence.wrapping_add(1);
            state.leased = true;
            state.answered = false;
            state.signaled = false;
            residual = state.message.take();
            sequence = state.sequence;
        }
        drop(residual);
        sequence
    }

    /// Store a reply for `sequence` and signal the waiter.
    ///
    /// Returns `false` (dropping the message) when the slot is not leased,
    /// is leased under another sequence, or already received its reply.
    pub(crate) fn deliver(&self, sequence: u32, message: M) -> bool {
        let mut state = self.state.lock();
        if !state.leased || state.answered || state.sequence != sequence {
            return false;
        }
        state.answered = true;
        state.message = Some(message);
        state.signaled = true;
        drop(state);
        self.ready.notify_one();
        true
    }

    /// Block until signaled or `deadline` passes. `None` waits indefinitely.
    pub(crate) fn wait(&self, sequence: u32, deadline: Option<Instant>) -> WaitOutcome<M> {
        let mut state = self.state.lock();
        debug_assert!(
            state.leased && state.sequence == sequence,
            "wait on slot {} outside occupancy {sequence}",
            self.identifier
        );

        while !state.signaled {
            match deadline {
                Some(deadline) => {
                    if self.ready.wait_until(&mut state, deadline).timed_out() && !state.signaled {
                        return WaitOutcome::TimedOut;
                    }
                }
                None => self.ready.wait(&mut state),
            }
        }

        state.signaled = false;
        match state.message.take() {
            Some(message) => WaitOutcome::Delivered(message),
            None => WaitOutcome::ForcedWake,
        }
    }

    /// End occupancy `sequence`. Returns whether an unconsumed reply was
    /// forfeited.
    pub(crate) fn retire(&self, sequence: u32) -> Result<bool, RetireError> {
        let residual;
        {
            let mut state = self.state.lock();
            if !state.leased {
                return Err(RetireError::NotLeased);
            }
            if state.sequence != sequence {
                return Err(RetireError::SequenceMismatch {
                    current: state.sequence,
                });
            }
            state.leased = false;
            state.signaled = false;
            residual = state.message.take();
        }
        Ok(residual.is_some())
    }

    /// Post the semaphore without a message.
    pub(crate) fn force_signal(&self) {
        self.state.lock().signaled = true;
        self.ready.notify_one();
    }

    /// Reset the semaphore without waking anyone.
    pub(crate) fn clear_signal(&self) {
        self.state.lock().signaled = false;
    }
}
