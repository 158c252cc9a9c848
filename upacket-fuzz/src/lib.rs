//! Fuzz entry points for upacket-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_receive

use upacket_core::{Config, Deframer, ManualClock, MemoryTransport, Status};

pub fn fuzz_decode(data: &[u8]) {
    use upacket_core::decode_frame_from_bytes;

    // Try to decode - should never panic
    let _ = decode_frame_from_bytes(&Config::default(), data);
}

pub fn fuzz_scan(data: &[u8]) {
    use upacket_core::scanner::scan_stream;

    // Try to scan - should never panic
    let _ = scan_stream(&Config::default(), data);
}

/// Drive the receive state machine over `data` until it is consumed
///
/// The first byte picks the buffer capacity. Every attempt must finish and
/// never report more bytes than the buffer holds.
pub fn fuzz_receive(data: &[u8]) {
    let Some((&capacity, stream)) = data.split_first() else {
        return;
    };

    let mut transport = MemoryTransport::with_clock(ManualClock::with_step(1));
    transport.feed(stream);

    let mut deframer = Deframer::default();
    let mut buf = vec![0u8; usize::from(capacity % 40)];

    loop {
        let Ok(received) = deframer.receive(&mut transport, &mut buf) else {
            return;
        };
        assert!(received.len <= buf.len());
        if received.status == Status::NoData {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzz_decode_empty() {
        fuzz_decode(&[]);
    }

    #[test]
    fn test_fuzz_decode_random() {
        fuzz_decode(&[0x7C, 0x12, 0x34, 0x56, 0x78, 0x7C]);
    }

    #[test]
    fn test_fuzz_scan_empty() {
        fuzz_scan(&[]);
    }

    #[test]
    fn test_fuzz_scan_random() {
        fuzz_scan(&[0x7C; 1024]);
    }

    #[test]
    fn test_fuzz_receive_empty() {
        fuzz_receive(&[]);
    }

    #[test]
    fn test_fuzz_receive_delimiters() {
        fuzz_receive(&[32, 0x7C, 0x7C, 0x7C, 0x7C, 0x7C, 0x7C, 0x7C, 0x7C, 0x7C]);
    }

    #[test]
    fn test_fuzz_receive_zero_capacity() {
        let mut data = vec![0u8];
        data.extend_from_slice(&[0x7C, 0x58, 0xDA, 0, 0, 0, 0, b'H', b'I', 0x7C]);
        fuzz_receive(&data);
    }
}
