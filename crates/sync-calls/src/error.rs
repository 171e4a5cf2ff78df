//! Error types for synchronous call correlation.

use crate::domain::CallHandle;
use thiserror::Error;

/// Caller-visible failures of a synchronous call.
///
/// Stale replies never show up here: they have no caller left to report to
/// and are absorbed by the pool.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallError {
    /// No reply arrived within the wait budget. The caller may retry.
    #[error("call {handle} timed out after {waited_ms}ms")]
    Timeout { handle: CallHandle, waited_ms: u64 },

    /// The waiter was force-woken with no reply (connection lost or shut down).
    #[error("connection lost while call {handle} was waiting")]
    ConnectionLost { handle: CallHandle },

    /// The outbound transport refused the request.
    #[error("failed to send call {handle}: {source}")]
    Send {
        handle: CallHandle,
        #[source]
        source: TransportError,
    },
}

impl CallError {
    /// Whether the caller may reasonably retry the logical call.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Handle of the call that failed.
    #[must_use]
    pub fn handle(&self) -> CallHandle {
        match self {
            Self::Timeout { handle, .. }
            | Self::ConnectionLost { handle }
            | Self::Send { handle, .. } => *handle,
        }
    }
}

/// Failures reported by an outbound transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport is disconnected")]
    Disconnected,

    #[error("transport rejected request: {0}")]
    Rejected(String),
}

/// Invalid pool configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_free_slots cannot be 0")]
    ZeroFreeSlots,

    #[error("default timeout cannot be 0")]
    ZeroTimeout,

    #[error("invalid value {value:?} for environment variable {var}")]
    InvalidEnv { var: &'static str, value: String },
}
