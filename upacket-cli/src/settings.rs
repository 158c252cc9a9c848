//! Link settings shared by all commands

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use upacket_core::Config;

/// Link configuration flags
///
/// Values come from the defaults, then the optional JSON file, then the
/// individual flags.
#[derive(Args, Debug, Clone, Default)]
pub struct LinkArgs {
    /// JSON file with link settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Delimiter byte: a single character, 0xNN or a decimal value
    #[arg(long, global = true, value_parser = parse_byte)]
    pub delimiter: Option<u8>,

    /// Placeholder byte: a single character, 0xNN or a decimal value
    #[arg(long, global = true, value_parser = parse_byte)]
    pub placeholder: Option<u8>,

    /// Per-packet receive timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Wait after connecting before trusting received bytes, in milliseconds
    #[arg(long, global = true)]
    pub settle_ms: Option<u64>,

    /// Keep bytes that follow a good packet instead of discarding them
    #[arg(long, global = true)]
    pub no_drain: bool,
}

impl LinkArgs {
    /// Build the effective configuration
    pub fn resolve(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                serde_json::from_str::<Config>(&content)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
            None => Config::default(),
        };

        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(placeholder) = self.placeholder {
            config.placeholder = placeholder;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(settle_ms) = self.settle_ms {
            config.settle_ms = settle_ms;
        }
        if self.no_drain {
            config.drain_residual = false;
        }

        config.validate().context("Invalid link settings")?;
        debug!("Effective link settings: {:?}", config);

        Ok(config)
    }
}

/// Parse a byte given as a single character, `0xNN` or a decimal number
pub fn parse_byte(s: &str) -> std::result::Result<u8, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u8::from_str_radix(hex, 16).map_err(|e| format!("invalid hex byte {}: {}", s, e));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && !c.is_ascii_digit() => Ok(c as u8),
        _ => s
            .parse::<u8>()
            .map_err(|e| format!("invalid byte {}: {}", s, e)),
    }
}
