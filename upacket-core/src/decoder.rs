//! Frame decoding
//!
//! [`Deframer`] pulls one frame off a live [`Transport`] under a single
//! deadline. [`decode_frame_from_bytes`] is the strict decoder for a frame
//! that is already complete in memory.

use crate::checksum::checksum;
use crate::config::Config;
use crate::constants::{HEADER_LEN, MAX_PAYLOAD_LEN, MIN_BUFFERED_AFTER_SYNC, MIN_FRAME_LEN};
use crate::error::PacketError;
use crate::transport::Transport;
use crate::types::{Packet, Received, Status};
use alloc::format;
use bytes::BytesMut;

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

/// Receive state machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No attempt in progress
    Idle,
    /// Discarding bytes until a delimiter
    Sync,
    /// Waiting for the header plus one more byte
    Header,
    /// Collecting payload bytes until the closing delimiter
    Payload { crc: u16, bitmap: u32, len: usize },
}

/// Result of one non-waiting step of the receive state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// The attempt needs more bytes or more time
    Pending,
    /// The attempt finished
    Ready(Received),
}

/// Receive-side state machine
///
/// One attempt runs Idle → Sync → Header → Payload and then verifies the
/// payload. The deadline is taken once, on entering Sync, and bounds the
/// whole attempt; it is never reset between states.
///
/// [`poll`](Self::poll) advances as far as the buffered bytes allow and
/// returns without waiting, for cooperative schedulers.
/// [`receive`](Self::receive) loops over `poll` until the attempt finishes.
#[derive(Debug, Clone)]
pub struct Deframer {
    config: Config,
    state: State,
    started_at: u64,
}

impl Deframer {
    /// Create a deframer for `config`
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: State::Idle,
            started_at: 0,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether no attempt is in progress
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// Abandon the attempt in progress
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    /// Receive one packet into `buf`, polling until the attempt finishes
    ///
    /// Returns [`Status::NoData`] immediately when nothing is buffered.
    /// Otherwise blocks for at most the configured timeout (plus the time
    /// taken by the transport itself). The contents of `buf` are only
    /// meaningful when the status is [`Status::Good`].
    pub fn receive<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        buf: &mut [u8],
    ) -> Result<Received, PacketError> {
        loop {
            if let Poll::Ready(received) = self.poll(transport, buf)? {
                return Ok(received);
            }
            core::hint::spin_loop();
        }
    }

    /// Advance the attempt without waiting
    ///
    /// `buf` must be the same buffer on every call of one attempt.
    pub fn poll<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        buf: &mut [u8],
    ) -> Result<Poll, PacketError> {
        let outcome = self.advance(transport, buf);
        if !matches!(outcome, Ok(Poll::Pending)) {
            self.state = State::Idle;
        }
        outcome
    }

    fn advance<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        buf: &mut [u8],
    ) -> Result<Poll, PacketError> {
        let delimiter = self.config.delimiter;

        loop {
            match self.state {
                State::Idle => {
                    if transport.bytes_available()? == 0 {
                        return Ok(Poll::Ready(Received::failed(Status::NoData)));
                    }
                    self.started_at = transport.millis();
                    self.state = State::Sync;
                }
                State::Sync => {
                    while transport.bytes_available()? > 0 {
                        if transport.read_byte()? == Some(delimiter) {
                            self.state = State::Header;
                            break;
                        }
                        if self.expired(transport) {
                            return Ok(self.fail(Status::Timeout));
                        }
                    }
                    if self.state == State::Header {
                        continue;
                    }
                    if self.expired(transport) {
                        return Ok(self.fail(Status::Timeout));
                    }
                    return Ok(Poll::Pending);
                }
                State::Header => {
                    let available = transport.bytes_available()?;
                    if available >= MIN_BUFFERED_AFTER_SYNC {
                        let mut header = [0u8; HEADER_LEN];
                        for slot in header.iter_mut() {
                            *slot = transport.read_byte()?.ok_or(PacketError::Underrun)?;
                        }
                        let crc = u16::from_be_bytes([header[0], header[1]]);
                        let bitmap =
                            u32::from_be_bytes([header[2], header[3], header[4], header[5]]);

                        #[cfg(feature = "logging")]
                        trace!("Header: crc {:#06x}, bitmap {:#010x}", crc, bitmap);

                        self.state = State::Payload {
                            crc,
                            bitmap,
                            len: 0,
                        };
                        continue;
                    }
                    if self.expired(transport) {
                        // Silence right after the delimiter is a timeout; a
                        // partial header is a malformed frame.
                        let status = if available == 0 {
                            Status::Timeout
                        } else {
                            Status::InvalidFormat
                        };
                        return Ok(self.fail(status));
                    }
                    return Ok(Poll::Pending);
                }
                State::Payload {
                    crc,
                    bitmap,
                    mut len,
                } => {
                    let capacity = buf.len().min(MAX_PAYLOAD_LEN);
                    while transport.bytes_available()? > 0 {
                        let byte = transport.read_byte()?.ok_or(PacketError::Underrun)?;
                        if byte == delimiter {
                            return self.verify(transport, buf, crc, bitmap, len).map(Poll::Ready);
                        }
                        if len >= capacity {
                            #[cfg(feature = "logging")]
                            warn!("Payload exceeds capacity of {} bytes", capacity);
                            return Ok(self.fail(Status::InvalidFormat));
                        }
                        buf[len] = byte;
                        len += 1;
                        if self.expired(transport) {
                            return Ok(self.fail(Status::InvalidFormat));
                        }
                    }
                    self.state = State::Payload { crc, bitmap, len };
                    if self.expired(transport) {
                        return Ok(self.fail(Status::InvalidFormat));
                    }
                    return Ok(Poll::Pending);
                }
            }
        }
    }

    fn verify<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        buf: &mut [u8],
        crc: u16,
        bitmap: u32,
        len: usize,
    ) -> Result<Received, PacketError> {
        let payload = &mut buf[..len];
        self.config.codec().decode(bitmap, payload);

        let actual = checksum(payload);
        if actual != crc {
            #[cfg(feature = "logging")]
            warn!(
                "Checksum mismatch: expected {:#06x}, got {:#06x}",
                crc, actual
            );
            return Ok(Received::failed(Status::ChecksumMismatch));
        }

        if self.config.drain_residual {
            // A peer that hangs up right after the frame still delivered it
            let residual = match transport.bytes_available() {
                Ok(n) => n,
                Err(PacketError::Disconnected) => 0,
                Err(e) => return Err(e),
            };
            for _ in 0..residual {
                transport.read_byte()?;
            }

            if residual > 0 {
                #[cfg(feature = "logging")]
                debug!("Drained {} residual bytes", residual);
            }
        }

        Ok(Received::good(len))
    }

    fn expired<T: Transport + ?Sized>(&self, transport: &T) -> bool {
        transport.millis().saturating_sub(self.started_at) > self.config.timeout_ms
    }

    fn fail(&self, status: Status) -> Poll {
        #[cfg(feature = "logging")]
        debug!("Receive attempt failed: {}", status);

        Poll::Ready(Received::failed(status))
    }
}

impl Default for Deframer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Decode one complete frame from the start of `data`
///
/// `data` must begin with the opening delimiter; bytes after the closing
/// delimiter are ignored and reported through [`Packet::wire_len`].
pub fn decode_frame_from_bytes(config: &Config, data: &[u8]) -> Result<Packet, PacketError> {
    let delimiter = config.delimiter;

    if data.len() < MIN_FRAME_LEN {
        return Err(PacketError::IncompleteFrame {
            expected: MIN_FRAME_LEN,
            actual: data.len(),
        });
    }

    if data[0] != delimiter {
        return Err(PacketError::InvalidFormat(format!(
            "expected delimiter {:#04x}, got {:#04x}",
            delimiter, data[0]
        )));
    }

    let crc = u16::from_be_bytes([data[1], data[2]]);
    let bitmap = u32::from_be_bytes([data[3], data[4], data[5], data[6]]);

    let body = &data[1 + HEADER_LEN..];
    let window = &body[..body.len().min(MAX_PAYLOAD_LEN + 1)];
    let end = match memchr::memchr(delimiter, window) {
        Some(end) => end,
        None if body.len() > MAX_PAYLOAD_LEN => {
            return Err(PacketError::InvalidFormat(format!(
                "no closing delimiter within {} payload bytes",
                MAX_PAYLOAD_LEN
            )));
        }
        None => {
            return Err(PacketError::IncompleteFrame {
                expected: data.len() + 1,
                actual: data.len(),
            });
        }
    };

    let mut payload = BytesMut::from(&body[..end]);
    config.codec().decode(bitmap, &mut payload);

    let actual = checksum(&payload);
    if actual != crc {
        return Err(PacketError::ChecksumMismatch {
            expected: crc,
            actual,
        });
    }

    Ok(Packet {
        payload: payload.freeze(),
        checksum: crc,
        bitmap,
        wire_len: 1 + HEADER_LEN + end + 1,
    })
}
