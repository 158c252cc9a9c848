//! # uPacket Core
//!
//! A delimiter-framed packet protocol for short (at most 32 byte) messages
//! over half-duplex serial links.
//!
//! ## Wire format
//!
//! ```text
//! | CRC_HI CRC_LO | BM3 BM2 BM1 BM0 | payload (0..=32, delimiters substituted) |
//! ```
//!
//! The checksum is CRC-16/XMODEM over the original payload. Bit *i* of the
//! bitmap is set when payload byte *i* was the delimiter; such bytes travel as
//! the placeholder and are restored by the receiver.
//!
//! ## Modules
//!
//! - `constants`: Wire format constants and limits
//! - `config`: Link configuration and its builder
//! - `types`: Receive status and decoded packets
//! - `checksum`: CRC-16/XMODEM
//! - `codec`: Delimiter substitution bitmap
//! - `encoder`: Frame encoding and sending
//! - `decoder`: Receive state machine and strict decoding
//! - `transport`: Transport and clock capabilities, in-memory and `std::io` transports
//! - `link`: Session owning one transport
//! - `scanner`: Recovery of frames from captured streams

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod checksum;
pub mod codec;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod link;
pub mod scanner;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use checksum::checksum;
pub use codec::Substitution;
pub use config::{Config, ConfigBuilder};
pub use decoder::{decode_frame_from_bytes, Deframer, Poll};
pub use encoder::{encode_frame, Framer};
pub use error::PacketError;
pub use link::Link;
pub use transport::{Clock, ManualClock, MemoryTransport, Transport};
pub use types::{Packet, Received, Status};

#[cfg(feature = "std")]
pub use transport::{IoTransport, SystemClock};

/// Result type alias for uPacket operations
pub type Result<T> = core::result::Result<T, PacketError>;
