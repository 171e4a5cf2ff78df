//! Domain Layer - handles, slots and configuration
//!
//! RULES:
//! - No I/O operations
//! - No knowledge of the transport or message format

pub mod config;
pub mod handle;
pub mod outcome;
pub(crate) mod slot;

pub use config::SlotPoolConfig;
pub use handle::{CallHandle, IDENTIFIER_BITS, MAX_IDENTIFIER};
pub use outcome::WaitOutcome;
