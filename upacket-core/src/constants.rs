//! Constants and limits for the uPacket wire format

/// Default frame delimiter (`|`)
pub const DEFAULT_DELIMITER: u8 = b'|';

/// Default placeholder written in place of a delimiter inside a payload (`+`)
pub const DEFAULT_PLACEHOLDER: u8 = b'+';

/// Default time to wait after opening a link, in milliseconds
pub const DEFAULT_SETTLE_MS: u64 = 1000;

/// Default per-packet receive timeout, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 50;

/// Width of the substitution bitmap in bits
pub const BITMAP_WIDTH: usize = 32;

/// Maximum payload length (one bitmap bit per payload byte)
pub const MAX_PAYLOAD_LEN: usize = BITMAP_WIDTH;

/// Size of the CRC-16 checksum on the wire
pub const CHECKSUM_LEN: usize = 2;

/// Size of the bitmap on the wire
pub const BITMAP_LEN: usize = 4;

/// Header size following the opening delimiter (checksum + bitmap)
pub const HEADER_LEN: usize = CHECKSUM_LEN + BITMAP_LEN;

/// Bytes that must be buffered after the opening delimiter before the header
/// is read: the header plus at least one payload byte or the closing delimiter
pub const MIN_BUFFERED_AFTER_SYNC: usize = HEADER_LEN + 1;

/// Framing overhead: two delimiters plus the header
pub const FRAME_OVERHEAD: usize = 2 + HEADER_LEN;

/// Size of the smallest valid frame (empty payload)
pub const MIN_FRAME_LEN: usize = FRAME_OVERHEAD;

/// Size of the largest valid frame
pub const MAX_FRAME_LEN: usize = FRAME_OVERHEAD + MAX_PAYLOAD_LEN;
