//! Library entry for upacket-cli used by integration tests and embedding.

pub mod commands;
pub mod settings;

// Re-export commands for convenience
pub use commands::*;
pub use settings::{parse_byte, LinkArgs};
