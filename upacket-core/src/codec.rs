//! Delimiter substitution codec
//!
//! A payload byte equal to the delimiter is sent as the placeholder byte and
//! its position is recorded in a 32-bit bitmap (bit 0 = first payload byte).
//! The receiver restores delimiters from the bitmap alone; placeholder bytes
//! are never inspected, so a payload may legitimately contain them.

use crate::constants::BITMAP_WIDTH;

/// Substitution rules for one delimiter/placeholder pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    delimiter: u8,
    placeholder: u8,
}

impl Substitution {
    /// Create a codec for the given delimiter and placeholder
    pub const fn new(delimiter: u8, placeholder: u8) -> Self {
        Self {
            delimiter,
            placeholder,
        }
    }

    /// Delimiter byte
    pub const fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Placeholder byte
    pub const fn placeholder(&self) -> u8 {
        self.placeholder
    }

    /// Compute the bitmap of delimiter positions in `payload`
    ///
    /// Positions at or beyond [`BITMAP_WIDTH`] are not representable and are
    /// never set; callers reject such payloads before encoding.
    pub fn encode(&self, payload: &[u8]) -> u32 {
        payload
            .iter()
            .take(BITMAP_WIDTH)
            .enumerate()
            .filter(|&(_, &byte)| byte == self.delimiter)
            .fold(0u32, |bitmap, (i, _)| bitmap | (1 << i))
    }

    /// Byte written on the wire for a payload byte
    pub const fn substitute(&self, byte: u8) -> u8 {
        if byte == self.delimiter {
            self.placeholder
        } else {
            byte
        }
    }

    /// Restore delimiter bytes in place according to `bitmap`
    pub fn decode(&self, bitmap: u32, payload: &mut [u8]) {
        for (i, byte) in payload.iter_mut().take(BITMAP_WIDTH).enumerate() {
            if bitmap & (1 << i) != 0 {
                *byte = self.delimiter;
            }
        }
    }
}

impl Default for Substitution {
    fn default() -> Self {
        Self::new(
            crate::constants::DEFAULT_DELIMITER,
            crate::constants::DEFAULT_PLACEHOLDER,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_marks_delimiter_positions() {
        let codec = Substitution::default();
        assert_eq!(codec.encode(b"A|B"), 0b10);
        assert_eq!(codec.encode(b"|||"), 0b111);
        assert_eq!(codec.encode(b"HELLO"), 0);
        assert_eq!(codec.encode(b""), 0);
    }

    #[test]
    fn test_substitute_and_restore() {
        let codec = Substitution::default();
        let payload = b"A|B";
        let bitmap = codec.encode(payload);

        let mut wire: Vec<u8> = payload.iter().map(|&b| codec.substitute(b)).collect();
        assert_eq!(wire, b"A+B");

        codec.decode(bitmap, &mut wire);
        assert_eq!(wire, payload);
    }

    #[test]
    fn test_placeholder_in_payload_is_untouched() {
        let codec = Substitution::default();
        let payload = b"1+1=2|";
        let bitmap = codec.encode(payload);
        assert_eq!(bitmap, 1 << 5);

        let mut wire: Vec<u8> = payload.iter().map(|&b| codec.substitute(b)).collect();
        assert_eq!(wire, b"1+1=2+");
        codec.decode(bitmap, &mut wire);
        assert_eq!(wire, payload);
    }

    #[test]
    fn test_last_bitmap_position() {
        let codec = Substitution::default();
        let mut payload = [b'x'; BITMAP_WIDTH];
        payload[BITMAP_WIDTH - 1] = b'|';
        assert_eq!(codec.encode(&payload), 1 << 31);
    }

    #[test]
    fn test_decode_ignores_bits_past_length() {
        let codec = Substitution::default();
        let mut payload = *b"ab";
        codec.decode(0xFFFF_FFFC, &mut payload);
        assert_eq!(&payload, b"ab");
    }
}
