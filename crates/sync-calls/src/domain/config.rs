//! Slot pool configuration with validation.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use sync_calls::SlotPoolConfig;
//!
//! let config = SlotPoolConfig::default()
//!     .with_max_free_slots(8)
//!     .with_default_timeout(Duration::from_secs(5));
//! assert!(config.validate().is_ok());
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Environment variable overriding [`SlotPoolConfig::max_free_slots`].
pub const ENV_MAX_FREE_SLOTS: &str = "SYNC_CALLS_MAX_FREE_SLOTS";

/// Environment variable overriding [`SlotPoolConfig::default_timeout_ms`].
pub const ENV_DEFAULT_TIMEOUT_MS: &str = "SYNC_CALLS_DEFAULT_TIMEOUT_MS";

/// Slot pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotPoolConfig {
    /// Released slots retained for reuse. Slots released beyond this stay
    /// allocated (so stale replies still resolve to them) but are never served
    /// again, so every burst of concurrent calls above this bound grows the
    /// slot table permanently by the overflow. Size it to the expected peak
    /// concurrency.
    pub max_free_slots: usize,
    /// Wait budget used by `get_message_default` and the call bridge
    pub default_timeout_ms: u64,
}

impl Default for SlotPoolConfig {
    fn default() -> Self {
        Self {
            max_free_slots: Self::DEFAULT_MAX_FREE_SLOTS,
            default_timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }
}

impl SlotPoolConfig {
    pub const DEFAULT_MAX_FREE_SLOTS: usize = 32;

    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

    /// Load configuration from the environment, falling back to defaults for
    /// unset variables.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidEnv` if a variable is set but does not parse, or
    /// any validation error from [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = read_env(ENV_MAX_FREE_SLOTS)? {
            config.max_free_slots = value;
        }
        if let Some(value) = read_env(ENV_DEFAULT_TIMEOUT_MS)? {
            config.default_timeout_ms = value;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_free_slots == 0 {
            return Err(ConfigError::ZeroFreeSlots);
        }
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Default wait budget as a `Duration`.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Builder-style method to set the free-list capacity
    #[must_use]
    pub fn with_max_free_slots(mut self, max_free_slots: usize) -> Self {
        self.max_free_slots = max_free_slots;
        self
    }

    /// Builder-style method to set the default wait budget, rounded up to
    /// whole milliseconds
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.default_timeout_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }
}

fn read_env<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        Err(_) => Ok(None),
    }
}
