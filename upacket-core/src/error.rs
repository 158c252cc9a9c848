//! Error types for uPacket operations

use crate::types::Status;
use alloc::string::String;

/// Errors that can occur while framing, deframing or talking to a transport
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq)]
pub enum PacketError {
    /// Payload is longer than the bitmap can describe
    #[cfg_attr(feature = "std", error("Payload size {len} exceeds maximum {max}"))]
    PayloadTooLarge {
        /// Length of the rejected payload.
        len: usize,
        /// Largest length the protocol accepts.
        max: usize,
    },

    /// Configuration values that cannot produce a working link
    #[cfg_attr(feature = "std", error("Invalid configuration: {0}"))]
    InvalidConfig(String),

    /// Frame bytes do not follow the wire layout
    #[cfg_attr(feature = "std", error("Invalid frame format: {0}"))]
    InvalidFormat(String),

    /// Incomplete frame - not enough data
    #[cfg_attr(feature = "std", error("Incomplete frame: expected {expected} bytes, got {actual}"))]
    IncompleteFrame {
        /// The number of bytes expected.
        expected: usize,
        /// The number of bytes actually found.
        actual: usize,
    },

    /// Checksum mismatch
    #[cfg_attr(feature = "std", error("Checksum mismatch: expected {expected:#06x}, got {actual:#06x}"))]
    ChecksumMismatch {
        /// The checksum carried by the frame.
        expected: u16,
        /// The checksum computed over the decoded payload.
        actual: u16,
    },

    /// Transport reported buffered bytes but delivered none
    #[cfg_attr(feature = "std", error("Transport underrun: no byte delivered although one was reported available"))]
    Underrun,

    /// The underlying stream reached end of file
    #[cfg_attr(feature = "std", error("Transport disconnected"))]
    Disconnected,

    /// IO error during read/write
    #[cfg_attr(feature = "std", error("IO error: {0}"))]
    Io(String),
}

impl PacketError {
    /// Protocol status equivalent of a decoding error, if there is one
    pub fn status(&self) -> Option<Status> {
        match self {
            PacketError::ChecksumMismatch { .. } => Some(Status::ChecksumMismatch),
            PacketError::InvalidFormat(_)
            | PacketError::IncompleteFrame { .. }
            | PacketError::PayloadTooLarge { .. } => Some(Status::InvalidFormat),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for PacketError {
    fn from(err: std::io::Error) -> Self {
        PacketError::Io(err.to_string())
    }
}
