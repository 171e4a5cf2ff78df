//! Call handle encoding.
//!
//! A handle is the only correlation data the transport carries. It packs the
//! slot identifier into the low 32 bits and the occupancy sequence into the
//! high 32 bits of a `u64`:
//!
//! ```text
//!  63                              32 31                               0
//! ┌──────────────────────────────────┬──────────────────────────────────┐
//! │            sequence              │           identifier             │
//! └──────────────────────────────────┴──────────────────────────────────┘
//! ```
//!
//! Sequences wrap modulo 2^32. A stale reply is only misattributed if the same
//! identifier is reacquired exactly 2^32 times while that reply is in flight.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bits reserved for the slot identifier.
pub const IDENTIFIER_BITS: u32 = 32;

/// Largest identifier a handle can carry.
pub const MAX_IDENTIFIER: u32 = u32::MAX;

/// Opaque correlation handle for one slot occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallHandle(u64);

impl CallHandle {
    /// Pack an identifier and sequence into a handle.
    #[must_use]
    pub const fn encode(identifier: u32, sequence: u32) -> Self {
        Self(((sequence as u64) << IDENTIFIER_BITS) | identifier as u64)
    }

    /// Rebuild a handle from the raw value carried in an envelope.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value to embed in an outbound envelope.
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Slot identifier.
    #[must_use]
    pub const fn identifier(self) -> u32 {
        self.0 as u32
    }

    /// Occupancy sequence.
    #[must_use]
    pub const fn sequence(self) -> u32 {
        (self.0 >> IDENTIFIER_BITS) as u32
    }
}

impl fmt::Display for CallHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl From<u64> for CallHandle {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<CallHandle> for u64 {
    fn from(handle: CallHandle) -> Self {
        handle.as_raw()
    }
}
