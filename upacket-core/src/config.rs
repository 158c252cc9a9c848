//! Link configuration

use crate::codec::Substitution;
use crate::constants::{
    DEFAULT_DELIMITER, DEFAULT_PLACEHOLDER, DEFAULT_SETTLE_MS, DEFAULT_TIMEOUT_MS,
};
use crate::error::PacketError;
use alloc::format;
use serde::{Deserialize, Serialize};

/// Immutable settings shared by the framer and deframer of one link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Byte marking frame boundaries
    pub delimiter: u8,

    /// Byte sent in place of a delimiter inside a payload
    pub placeholder: u8,

    /// Wait after opening a link before trusting received bytes (ms)
    pub settle_ms: u64,

    /// Deadline for one receive attempt, measured from synchronization (ms)
    pub timeout_ms: u64,

    /// Discard bytes left on the transport after a good packet
    pub drain_residual: bool,
}

impl Config {
    /// Start building a configuration from the defaults
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Check that the configuration can produce unambiguous frames
    pub fn validate(&self) -> Result<(), PacketError> {
        if self.delimiter == self.placeholder {
            return Err(PacketError::InvalidConfig(format!(
                "delimiter and placeholder must differ (both {:#04x})",
                self.delimiter
            )));
        }

        Ok(())
    }

    /// Substitution codec for this delimiter/placeholder pair
    pub const fn codec(&self) -> Substitution {
        Substitution::new(self.delimiter, self.placeholder)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            placeholder: DEFAULT_PLACEHOLDER,
            settle_ms: DEFAULT_SETTLE_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            drain_residual: true,
        }
    }
}

/// Builder for [`Config`]
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder holding the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delimiter byte
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// Set the placeholder byte
    pub fn placeholder(mut self, placeholder: u8) -> Self {
        self.config.placeholder = placeholder;
        self
    }

    /// Set the settle delay in milliseconds
    pub fn settle_ms(mut self, settle_ms: u64) -> Self {
        self.config.settle_ms = settle_ms;
        self
    }

    /// Set the per-packet timeout in milliseconds
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    /// Enable or disable draining residual bytes after a good packet
    pub fn drain_residual(mut self, drain: bool) -> Self {
        self.config.drain_residual = drain;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<Config, PacketError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
