//! Stream scanner for captured or noisy input

use crate::config::Config;
use crate::decoder::decode_frame_from_bytes;
use crate::error::PacketError;
use crate::types::Packet;
use alloc::vec::Vec;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// A packet found at a specific offset in the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedPacket {
    /// Byte offset of the opening delimiter
    pub offset: usize,

    /// The decoded packet
    pub packet: Packet,
}

/// Scan a captured byte stream for valid frames
///
/// This function:
/// 1. Searches for the next delimiter
/// 2. Attempts a strict decode of a frame opening at that delimiter
/// 3. On success, resumes after the closing delimiter
/// 4. On failure, resumes after the delimiter that was tried
///
/// A failed attempt at a closing delimiter (of a frame whose start was lost)
/// is expected and harmless: the next delimiter is tried next.
pub fn scan_stream(config: &Config, data: &[u8]) -> Vec<LocatedPacket> {
    scan_stream_with_stats(config, data).0
}

/// Scan statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanStats {
    /// Total bytes scanned
    pub bytes_scanned: usize,

    /// Delimiters at which a decode was attempted
    pub delimiters_tried: usize,

    /// Packets successfully decoded
    pub packets_found: usize,

    /// Framed correctly but failed checksum verification
    pub checksum_failures: usize,

    /// Attempts rejected for layout reasons
    pub format_failures: usize,

    /// Total wire bytes covered by decoded frames
    pub bytes_recovered: usize,
}

impl ScanStats {
    /// Share of the scanned bytes that belonged to decoded frames, in percent
    pub fn recovery_rate(&self) -> f64 {
        if self.bytes_scanned == 0 {
            0.0
        } else {
            (self.bytes_recovered as f64 / self.bytes_scanned as f64) * 100.0
        }
    }
}

/// Scan with detailed statistics
pub fn scan_stream_with_stats(config: &Config, data: &[u8]) -> (Vec<LocatedPacket>, ScanStats) {
    let mut results = Vec::new();
    let mut stats = ScanStats {
        bytes_scanned: data.len(),
        ..ScanStats::default()
    };
    let mut pos = 0;

    #[cfg(feature = "logging")]
    debug!("Starting stream scan of {} bytes", data.len());

    while let Some(found) = memchr::memchr(config.delimiter, &data[pos..]) {
        let offset = pos + found;
        stats.delimiters_tried += 1;

        match decode_frame_from_bytes(config, &data[offset..]) {
            Ok(packet) => {
                #[cfg(feature = "logging")]
                debug!(
                    "Decoded {} byte packet at offset {}",
                    packet.len(),
                    offset
                );

                pos = offset + packet.wire_len;
                stats.packets_found += 1;
                stats.bytes_recovered += packet.wire_len;
                results.push(LocatedPacket { offset, packet });
            }
            Err(e) => {
                #[cfg(feature = "logging")]
                warn!("No frame at offset {}: {:?}", offset, e);

                match e {
                    PacketError::ChecksumMismatch { .. } => stats.checksum_failures += 1,
                    _ => stats.format_failures += 1,
                }
                pos = offset + 1;
            }
        }

        if pos >= data.len() {
            break;
        }
    }

    #[cfg(feature = "logging")]
    debug!(
        "Scan complete: found {} packets out of {} bytes scanned",
        stats.packets_found,
        data.len()
    );

    (results, stats)
}
