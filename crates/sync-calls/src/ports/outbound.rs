//! Outbound Ports (Driven Ports)

use crate::domain::CallHandle;
use crate::error::TransportError;
use std::sync::Arc;

/// Sends a request envelope carrying `handle` verbatim.
///
/// The reply, when it arrives, must be routed back with the same handle.
pub trait RequestTransport<Req>: Send + Sync {
    fn send(&self, handle: CallHandle, request: Req) -> Result<(), TransportError>;
}

impl<Req, T> RequestTransport<Req> for Arc<T>
where
    T: RequestTransport<Req> + ?Sized,
{
    fn send(&self, handle: CallHandle, request: Req) -> Result<(), TransportError> {
        (**self).send(handle, request)
    }
}
