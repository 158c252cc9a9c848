//! A uPacket session over one transport

use crate::config::Config;
use crate::decoder::{Deframer, Poll};
use crate::encoder::Framer;
use crate::error::PacketError;
use crate::transport::Transport;
use crate::types::Received;

#[cfg(feature = "logging")]
use tracing::debug;

/// One end of a uPacket link
///
/// Owns the transport and an immutable configuration. Several links can
/// coexist, one per transport.
#[derive(Debug)]
pub struct Link<T> {
    transport: T,
    framer: Framer,
    deframer: Deframer,
}

impl<T: Transport> Link<T> {
    /// Create a link without waiting for the peer to settle
    pub fn new(transport: T, config: Config) -> Result<Self, PacketError> {
        config.validate()?;

        Ok(Self {
            transport,
            framer: Framer::new(config),
            deframer: Deframer::new(config),
        })
    }

    /// Create a link, wait the settle delay and discard whatever arrived meanwhile
    ///
    /// Many boards reset when their serial port is opened and print boot
    /// noise before running the protocol.
    pub fn begin(transport: T, config: Config) -> Result<Self, PacketError> {
        let mut link = Self::new(transport, config)?;
        link.transport.delay_ms(config.settle_ms);
        let discarded = link.discard_pending()?;

        #[cfg(feature = "logging")]
        debug!(
            "Link settled after {} ms, discarded {} bytes",
            config.settle_ms, discarded
        );
        #[cfg(not(feature = "logging"))]
        let _ = discarded;

        Ok(link)
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        self.framer.config()
    }

    /// Frame and send `payload` (at most 32 bytes)
    pub fn send(&mut self, payload: &[u8]) -> Result<(), PacketError> {
        self.framer.send(&mut self.transport, payload)
    }

    /// Receive one packet into `buf`, waiting at most one timeout
    pub fn receive(&mut self, buf: &mut [u8]) -> Result<Received, PacketError> {
        self.deframer.receive(&mut self.transport, buf)
    }

    /// Advance the current receive attempt without waiting
    pub fn poll_receive(&mut self, buf: &mut [u8]) -> Result<Poll, PacketError> {
        self.deframer.poll(&mut self.transport, buf)
    }

    /// Whether any bytes are waiting on the transport
    pub fn available(&mut self) -> Result<bool, PacketError> {
        Ok(self.transport.bytes_available()? > 0)
    }

    /// Borrow the transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the link and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    fn discard_pending(&mut self) -> Result<usize, PacketError> {
        let pending = self.transport.bytes_available()?;
        for _ in 0..pending {
            self.transport.read_byte()?;
        }
        Ok(pending)
    }
}
