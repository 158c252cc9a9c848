//! Core types for uPacket receive outcomes

use bytes::Bytes;
use core::fmt;

/// Outcome of one receive attempt
///
/// The numeric codes are part of the public contract and match the codes
/// reported by existing device firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    /// Nothing buffered on the transport; try again later
    NoData = 0,
    /// No delimiter arrived before the deadline
    Timeout = 1,
    /// Frame was delimited correctly but its checksum did not match
    ChecksumMismatch = 2,
    /// Frame was truncated, oversized or otherwise malformed
    InvalidFormat = 3,
    /// Payload was decoded and verified
    Good = 4,
}

impl Status {
    /// Stable numeric code
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether the receive buffer holds a verified payload
    pub const fn is_good(self) -> bool {
        matches!(self, Status::Good)
    }
}

impl TryFrom<u8> for Status {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Status::NoData),
            1 => Ok(Status::Timeout),
            2 => Ok(Status::ChecksumMismatch),
            3 => Ok(Status::InvalidFormat),
            4 => Ok(Status::Good),
            other => Err(other),
        }
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::NoData => "no data",
            Status::Timeout => "timeout",
            Status::ChecksumMismatch => "checksum mismatch",
            Status::InvalidFormat => "invalid format",
            Status::Good => "good",
        };
        f.write_str(name)
    }
}

/// Status of a receive attempt plus the number of payload bytes it produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Received {
    /// Protocol status
    pub status: Status,

    /// Number of payload bytes written to the caller's buffer
    ///
    /// Only meaningful when `status` is [`Status::Good`]; zero otherwise.
    pub len: usize,
}

impl Received {
    /// A verified payload of `len` bytes
    pub const fn good(len: usize) -> Self {
        Self {
            status: Status::Good,
            len,
        }
    }

    /// A failed or empty attempt
    pub const fn failed(status: Status) -> Self {
        Self { status, len: 0 }
    }

    /// Borrow the verified payload out of the buffer passed to `receive`
    pub fn payload<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        if self.status.is_good() {
            buf.get(..self.len)
        } else {
            None
        }
    }
}

/// A frame decoded from a complete wire image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Decoded payload with delimiter bytes restored
    pub payload: Bytes,

    /// Checksum carried in the header
    pub checksum: u16,

    /// Substitution bitmap carried in the header
    pub bitmap: u32,

    /// Number of wire bytes the frame occupied, both delimiters included
    pub wire_len: usize,
}

impl Packet {
    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
