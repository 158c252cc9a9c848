//! Subcommand implementations

pub mod checksum;
pub mod decode;
pub mod echo;
pub mod encode;
pub mod send;

use anyhow::{bail, Context, Result};

/// Payload given on the command line as text or hex
pub fn payload_from_args(text: Option<&str>, hex: Option<&str>) -> Result<Vec<u8>> {
    match (text, hex) {
        (Some(text), None) => Ok(text.as_bytes().to_vec()),
        (None, Some(hex)) => {
            hex::decode(hex.trim()).with_context(|| format!("Invalid hex payload: {}", hex))
        }
        (None, None) => bail!("Provide a payload with --text or --hex"),
        (Some(_), Some(_)) => bail!("--text and --hex cannot be combined"),
    }
}
