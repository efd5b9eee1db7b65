//! Engine configuration.
//!
//! Every field has a default, so a JSON file only needs the knobs it changes:
//!
//! ```json
//! { "workers": 8, "policy": "spin" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::concurrency::HandoffPolicy;

/// Errors raised while loading or validating an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration is not valid JSON for [`EngineConfig`].
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    /// A field holds an unusable value.
    #[error("invalid config: `{field}` {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Tuning knobs of the parallel traversal engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads per traversal.
    pub workers: usize,
    /// Entries of `current` reserved per read.
    pub read_block: usize,
    /// Slots of `next` reserved per write.
    pub write_block: usize,
    /// How workers wait at phase handoffs.
    pub policy: HandoffPolicy,
    /// Pin each worker to one of the allowed CPUs.
    pub pin_workers: bool,
    /// Put the cuckoo pre-filter in front of the visited set.
    pub prefilter: bool,
}

/// Default reservation size for both cursors.
pub const DEFAULT_BLOCK: usize = 256;

/// Largest accepted reservation size for either cursor.
pub const MAX_BLOCK: usize = 1 << 20;

/// Largest accepted worker count.
pub const MAX_WORKERS: usize = 1 << 12;

/// Largest accepted `write_block * workers`: the slots each frontier buffer
/// carries beyond the node count for partially filled reservations.
pub const MAX_RESERVATION_SLACK: usize = 1 << 26;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            read_block: DEFAULT_BLOCK,
            write_block: DEFAULT_BLOCK,
            policy: HandoffPolicy::default(),
            pin_workers: false,
            prefilter: false,
        }
    }
}

/// Number of CPUs available to the process (at most [`MAX_WORKERS`]), or 1 if
/// unknown.
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get().min(MAX_WORKERS))
}

impl EngineConfig {
    /// Sets the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the read reservation size.
    #[must_use]
    pub fn with_read_block(mut self, block: usize) -> Self {
        self.read_block = block;
        self
    }

    /// Sets the write reservation size.
    #[must_use]
    pub fn with_write_block(mut self, block: usize) -> Self {
        self.write_block = block;
        self
    }

    /// Sets the handoff policy.
    #[must_use]
    pub fn with_policy(mut self, policy: HandoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enables or disables worker pinning.
    #[must_use]
    pub fn with_pinning(mut self, pin: bool) -> Self {
        self.pin_workers = pin;
        self
    }

    /// Enables or disables the cuckoo pre-filter.
    #[must_use]
    pub fn with_prefilter(mut self, prefilter: bool) -> Self {
        self.prefilter = prefilter;
        self
    }

    /// Checks that every count is usable. A configuration that validates
    /// never overflows the frontier sizing of a traversal.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for a zero worker count or block size,
    /// a count above [`MAX_WORKERS`] / [`MAX_BLOCK`], or a `write_block *
    /// workers` above [`MAX_RESERVATION_SLACK`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        for (field, value, max) in [
            ("workers", self.workers, MAX_WORKERS),
            ("read_block", self.read_block, MAX_BLOCK),
            ("write_block", self.write_block, MAX_BLOCK),
        ] {
            if value == 0 {
                return invalid(field, "must be greater than zero");
            }
            if value > max {
                return invalid(field, "exceeds its maximum");
            }
        }
        match self.write_block.checked_mul(self.workers) {
            Some(slack) if slack <= MAX_RESERVATION_SLACK => Ok(()),
            _ => invalid("write_block", "times workers exceeds the reservation slack limit"),
        }
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::Json`] for malformed input and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    /// See [`from_json_str`](Self::from_json_str); I/O failures map to
    /// [`ConfigError::Io`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
