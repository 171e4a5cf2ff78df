//! Result of waiting on a slot.

use crate::domain::CallHandle;
use crate::error::CallError;
use std::time::Duration;

/// How a blocked `get_message` ended.
///
/// The two empty cases are deliberately distinct: a timeout is retryable, a
/// forced wake means the connection went away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<M> {
    /// A reply for this occupancy arrived.
    Delivered(M),
    /// The wait budget ran out with no reply.
    TimedOut,
    /// Woken by a pool-wide signal with no reply present.
    ForcedWake,
}

impl<M> WaitOutcome<M> {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }

    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }

    #[must_use]
    pub fn is_forced_wake(&self) -> bool {
        matches!(self, Self::ForcedWake)
    }

    /// The delivered message, if any.
    pub fn message(self) -> Option<M> {
        match self {
            Self::Delivered(message) => Some(message),
            Self::TimedOut | Self::ForcedWake => None,
        }
    }

    /// Map the empty outcomes onto caller errors.
    pub fn into_result(self, handle: CallHandle, waited: Duration) -> Result<M, CallError> {
        match self {
            Self::Delivered(message) => Ok(message),
            Self::TimedOut => Err(CallError::Timeout {
                handle,
                waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
            }),
            Self::ForcedWake => Err(CallError::ConnectionLost { handle }),
        }
    }
}
