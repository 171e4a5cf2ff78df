//! Inbound Ports (Driving Ports)

use crate::domain::CallHandle;

/// What happened to a routed reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteResult {
    /// Stored in the waiting slot and signaled.
    Delivered,
    /// Handle no longer names a live occupancy; the reply was dropped.
    Stale,
}

impl RouteResult {
    #[must_use]
    pub fn is_delivered(self) -> bool {
        self == Self::Delivered
    }
}

/// Delivery entry point called by the transport for every inbound reply.
///
/// Implementations never block waiting for the caller to consume the reply.
pub trait ReplyRouter<M>: Send + Sync {
    fn route(&self, handle: CallHandle, message: M) -> RouteResult;
}

/// Pool-wide signaling used on disconnect and reconnect.
pub trait ConnectionLifecycle: Send + Sync {
    /// Wake every waiter with no message. Returns the number of slots signaled.
    fn signal_all(&self) -> usize;

    /// Reset every slot's semaphore without waking anyone. Returns the number
    /// of slots cleared.
    fn clear_all(&self) -> usize;
}
