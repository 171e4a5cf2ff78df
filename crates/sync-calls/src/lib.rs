//! # Sync Calls - Blocking Slots for Synchronous Calls
//!
//! Correlates replies arriving on an asynchronous, message-based transport with
//! the threads blocked waiting for them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  acquire()   ┌──────────────────────────────┐
//! │ Caller       │ ───────────► │ SlotPool                     │
//! │ thread       │ ◄─────────── │  slots: [0][1][2] ...        │
//! │              │   CallSlot   │  free:  [2]                  │
//! │  handle() ───┼──► request   │                              │
//! │  get_message │              │        route(handle, reply)  │ ◄── transport
//! │      ▲       │              │           │                  │     receive
//! └──────┼───────┘              └───────────┼──────────────────┘     thread
//!        └────────── signal ◄───────────────┘
//! ```
//!
//! - **Domain Layer** (`domain/`): handle encoding, slot cell, wait outcome,
//!   configuration
//! - **Ports Layer** (`ports/`): `ReplyRouter`, `ConnectionLifecycle`,
//!   `RequestTransport`
//! - **Service Layer** (`service/`): `SlotPool`, `CallSlot`, `SyncCallBridge`
//!
//! ## Invariants
//!
//! - A handle names one occupancy of one slot. Once that occupancy ends, every
//!   reply routed with the handle is dropped.
//! - At most one reply is accepted per occupancy and it is handed to the
//!   caller at most once.
//! - The free list never holds more than `max_free_slots` slots.
//! - Only `get_message` blocks, and never while holding the allocation lock.
//!
//! ## Usage Example
//!
//! ```
//! use std::time::Duration;
//! use sync_calls::{SlotPool, WaitOutcome};
//!
//! let pool = SlotPool::<String>::new();
//! let slot = pool.acquire();
//! let handle = slot.handle();
//!
//! // ... the transport sends `handle` with the request, and later the
//! // receive thread routes the reply:
//! pool.route(handle, "pong".to_string());
//!
//! assert_eq!(
//!     slot.get_message(Duration::from_secs(1)),
//!     WaitOutcome::Delivered("pong".to_string())
//! );
//! slot.release();
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main types
pub use domain::{CallHandle, SlotPoolConfig, WaitOutcome};
pub use error::{CallError, ConfigError, TransportError};
pub use metrics::{MetricsRecorder, MetricsSnapshot, NoOpMetrics, PoolMetrics};
pub use ports::{ConnectionLifecycle, ReplyRouter, RequestTransport, RouteResult};
pub use service::{CallSlot, SlotPool, SyncCallBridge};
