//! CRC-16/XMODEM integrity code

use crc::{Crc, CRC_16_XMODEM};

const XMODEM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Compute the CRC-16/XMODEM checksum of `data`
///
/// Polynomial 0x1021, initial value 0, no reflection and no final XOR. The
/// value is bit-compatible with the firmware implementation, which shifts
/// each byte into the high half of the register and runs eight
/// shift/conditional-XOR rounds.
pub fn checksum(data: &[u8]) -> u16 {
    XMODEM.checksum(data)
}
