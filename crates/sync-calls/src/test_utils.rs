//! In-memory transport for tests.
//!
//! Requires feature: `test-utils`

use crate::domain::CallHandle;
use crate::error::TransportError;
use crate::ports::RequestTransport;
use parking_lot::Mutex;
use std::sync::mpsc;

/// Request as seen by the far side of a [`LoopbackTransport`].
pub type SentRequest<Req> = (CallHandle, Req);

/// Transport that hands every request to an in-process channel.
///
/// A test plays the remote peer by reading the receiver and routing replies
/// back through the pool or bridge.
pub struct LoopbackTransport<Req> {
    sender: Mutex<Option<mpsc::Sender<SentRequest<Req>>>>,
}

impl<Req: Send> LoopbackTransport<Req> {
    pub fn channel() -> (Self, mpsc::Receiver<SentRequest<Req>>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                sender: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Make every later send fail with `TransportError::Disconnected`.
    pub fn disconnect(&self) {
        self.sender.lock().take();
    }
}

impl<Req: Send> RequestTransport<Req> for LoopbackTransport<Req> {
    fn send(&self, handle: CallHandle, request: Req) -> Result<(), TransportError> {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return Err(TransportError::Disconnected);
        };
        sender
            .send((handle, request))
            .map_err(|_| TransportError::Disconnected)
    }
}

/// Transport that refuses everything with the given reason.
pub struct RejectingTransport(pub String);

impl<Req> RequestTransport<Req> for RejectingTransport {
    fn send(&self, _handle: CallHandle, _request: Req) -> Result<(), TransportError> {
        Err(TransportError::Rejected(self.0.clone()))
    }
}
