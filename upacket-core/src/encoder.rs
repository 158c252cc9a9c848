//! Frame encoding

use crate::checksum::checksum;
use crate::config::Config;
use crate::constants::{FRAME_OVERHEAD, MAX_PAYLOAD_LEN};
use crate::error::PacketError;
use crate::transport::Transport;
use bytes::{BufMut, Bytes, BytesMut};

#[cfg(feature = "logging")]
use tracing::trace;

/// Writes payloads as delimited frames
///
/// The frame is laid out as:
/// 1. Delimiter (1 byte)
/// 2. CRC-16/XMODEM of the original payload (2 bytes, big-endian)
/// 3. Substitution bitmap (4 bytes, big-endian)
/// 4. Payload with every delimiter replaced by the placeholder (0..=32 bytes)
/// 5. Delimiter (1 byte)
#[derive(Debug, Clone, Copy)]
pub struct Framer {
    config: Config,
}

impl Framer {
    /// Create a framer for `config`
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Encode `payload` into a complete wire frame
    pub fn encode(&self, payload: &[u8]) -> Result<Bytes, PacketError> {
        let (crc, bitmap) = self.prepare(payload)?;
        let codec = self.config.codec();

        let mut buf = BytesMut::with_capacity(FRAME_OVERHEAD + payload.len());
        buf.put_u8(self.config.delimiter);
        buf.put_u16(crc);
        buf.put_u32(bitmap);
        for &byte in payload {
            buf.put_u8(codec.substitute(byte));
        }
        buf.put_u8(self.config.delimiter);

        Ok(buf.freeze())
    }

    /// Frame `payload` and write it to `transport`
    ///
    /// Nothing is written when the payload is rejected.
    pub fn send<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        payload: &[u8],
    ) -> Result<(), PacketError> {
        let (crc, bitmap) = self.prepare(payload)?;
        let codec = self.config.codec();

        transport.write_byte(self.config.delimiter)?;
        transport.write_all(&crc.to_be_bytes())?;
        transport.write_all(&bitmap.to_be_bytes())?;
        for &byte in payload {
            transport.write_byte(codec.substitute(byte))?;
        }
        transport.write_byte(self.config.delimiter)?;
        transport.flush()?;

        #[cfg(feature = "logging")]
        trace!(
            "Sent {} byte payload (crc {:#06x}, bitmap {:#010x})",
            payload.len(),
            crc,
            bitmap
        );

        Ok(())
    }

    fn prepare(&self, payload: &[u8]) -> Result<(u16, u32), PacketError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(PacketError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }

        Ok((checksum(payload), self.config.codec().encode(payload)))
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Encode `payload` with `config` into a complete wire frame
pub fn encode_frame(config: &Config, payload: &[u8]) -> Result<Bytes, PacketError> {
    Framer::new(*config).encode(payload)
}
