//! Service Layer
//!
//! - `SlotPool`: slot allocation, reply routing, pool-wide signaling
//! - `CallSlot`: one caller's lease
//! - `SyncCallBridge`: blocking request/response over a `RequestTransport`

pub mod bridge;
pub mod call_slot;
pub mod pool;

pub use bridge::SyncCallBridge;
pub use call_slot::CallSlot;
pub use pool::SlotPool;
