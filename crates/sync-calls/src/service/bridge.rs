//! Blocking request/response bridge over an asynchronous transport.
//!
//! ```text
//!   caller thread                     transport receive thread
//!   ─────────────                     ────────────────────────
//!   call(request) ──► acquire slot
//!                     send(handle, request) ──► wire ──► peer
//!                     wait on slot                        │
//!                          ▲                              ▼
//!                          └──── on_reply(handle, reply) ◄┘
//!   ◄── reply         release slot
//! ```

use crate::domain::{CallHandle, SlotPoolConfig};
use crate::error::{CallError, ConfigError};
use crate::ports::{ConnectionLifecycle, ReplyRouter, RequestTransport, RouteResult};
use crate::service::SlotPool;
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Synchronous call client.
///
/// Share it between caller threads and the transport receive thread (for
/// example behind an `Arc`). Sends are never retried.
pub struct SyncCallBridge<Req, Rep, T> {
    pool: SlotPool<Rep>,
    transport: T,
    _request: PhantomData<fn(Req)>,
}

impl<Req, Rep, T> SyncCallBridge<Req, Rep, T>
where
    T: RequestTransport<Req>,
{
    /// Create a bridge with a default-configured pool.
    pub fn new(transport: T) -> Self {
        Self::with_pool(SlotPool::new(), transport)
    }

    /// Create a bridge with a validated pool configuration.
    ///
    /// # Errors
    ///
    /// Any error from [`SlotPoolConfig::validate`].
    pub fn with_config(config: SlotPoolConfig, transport: T) -> Result<Self, ConfigError> {
        Ok(Self::with_pool(SlotPool::with_config(config)?, transport))
    }

    pub fn with_pool(pool: SlotPool<Rep>, transport: T) -> Self {
        Self {
            pool,
            transport,
            _request: PhantomData,
        }
    }

    /// Send `request` and block until its reply arrives or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// - `CallError::Send` if the transport refuses the request
    /// - `CallError::Timeout` if no reply arrives in time
    /// - `CallError::ConnectionLost` if woken by [`connection_lost`](Self::connection_lost)
    pub fn call(&self, request: Req, timeout: Duration) -> Result<Rep, CallError> {
        let slot = self.pool.acquire();
        let handle = slot.handle();

        if let Err(source) = self.transport.send(handle, request) {
            warn!(handle = %handle, error = %source, "Failed to send synchronous call");
            return Err(CallError::Send { handle, source });
        }

        let started = Instant::now();
        let result = slot.get_message(timeout).into_result(handle, started.elapsed());
        if let Err(err) = &result {
            debug!(handle = %handle, error = %err, "Synchronous call failed");
        }
        result
    }

    /// [`call`](Self::call) with the pool's default timeout.
    pub fn call_default(&self, request: Req) -> Result<Rep, CallError> {
        self.call(request, self.pool.config().default_timeout())
    }

    /// Transport-inbound entry point for every reply.
    pub fn on_reply(&self, handle: CallHandle, reply: Rep) -> RouteResult {
        self.pool.route(handle, reply)
    }

    /// Fail every in-flight call with `CallError::ConnectionLost`.
    pub fn connection_lost(&self) -> usize {
        warn!("Connection lost; waking all synchronous callers");
        self.pool.signal_all_semaphores()
    }

    /// Discard stale wake-ups before reusing the pool on a new connection.
    pub fn connection_reset(&self) -> usize {
        self.pool.clear_all_semaphores()
    }

    pub fn pool(&self) -> &SlotPool<Rep> {
        &self.pool
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<Req, Rep, T> ReplyRouter<Rep> for SyncCallBridge<Req, Rep, T>
where
    Rep: Send,
    T: RequestTransport<Req>,
{
    fn route(&self, handle: CallHandle, message: Rep) -> RouteResult {
        self.on_reply(handle, message)
    }
}

impl<Req, Rep, T> ConnectionLifecycle for SyncCallBridge<Req, Rep, T>
where
    Rep: Send,
    T: RequestTransport<Req>,
{
    fn signal_all(&self) -> usize {
        self.connection_lost()
    }

    fn clear_all(&self) -> usize {
        self.connection_reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::test_utils::{LoopbackTransport, RejectingTransport};
    use std::thread;

    /// Peer that answers each request with its uppercase form.
    fn echo_upper(
        bridge: &SyncCallBridge<String, String, LoopbackTransport<String>>,
        requests: std::sync::mpsc::Receiver<(CallHandle, String)>,
    ) {
        for (handle, request) in requests.iter() {
            bridge.on_reply(handle, request.to_uppercase());
        }
    }

    #[test]
    fn test_call_round_trip() {
        let (transport, requests) = LoopbackTransport::channel();
        let bridge = SyncCallBridge::new(transport);

        thread::scope(|scope| {
            scope.spawn(|| echo_upper(&bridge, requests));

            assert_eq!(
                bridge.call("ping".to_string(), Duration::from_secs(5)),
                Ok("PING".to_string())
            );
            assert_eq!(bridge.call_default("pong".to_string()), Ok("PONG".to_string()));

            bridge.transport().disconnect();
        });

        assert_eq!(bridge.pool().outstanding(), 0);
        assert_eq!(bridge.pool().metrics().snapshot().delivered, 2);
    }

    #[test]
    fn test_send_failure_releases_slot() {
        let bridge: SyncCallBridge<String, String, _> =
            SyncCallBridge::new(RejectingTransport("full".into()));

        let err = bridge
            .call("ping".to_string(), Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(
            err,
            CallError::Send {
                source: TransportError::Rejected(ref reason),
                ..
            } if reason == "full"
        ));
        assert_eq!(bridge.pool().outstanding(), 0);
        assert_eq!(bridge.pool().free_slots(), 1);
    }

    #[test]
    fn test_unanswered_call_times_out() {
        let (transport, _requests) = LoopbackTransport::<String>::channel();
        let bridge = SyncCallBridge::<String, String, _>::new(transport);

        let err = bridge
            .call("ping".to_string(), Duration::from_millis(20))
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(bridge.pool().metrics().snapshot().timeouts, 1);

        // The reply shows up after the caller gave up.
        let late: CallHandle = err.handle();
        assert_eq!(bridge.on_reply(late, "PING".into()), RouteResult::Stale);
    }

    #[test]
    fn test_connection_lost_fails_waiting_call() {
        let (transport, requests) = LoopbackTransport::<String>::channel();
        let bridge = SyncCallBridge::<String, String, _>::new(transport);

        let result = thread::scope(|scope| {
            let caller = scope.spawn(|| bridge.call("ping".to_string(), Duration::from_secs(10)));
            // Wait until the request is on the wire, then drop the connection.
            let (handle, _) = requests.recv().unwrap();
            thread::sleep(Duration::from_millis(10));
            bridge.connection_lost();
            (handle, caller.join().unwrap())
        });

        assert_eq!(result.1, Err(CallError::ConnectionLost { handle: result.0 }));
        assert_eq!(bridge.connection_reset(), 1);
    }
}
