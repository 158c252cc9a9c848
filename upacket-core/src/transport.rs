//! Byte transports and clocks
//!
//! The protocol engine only needs four capabilities from the link it runs
//! on: how many bytes are buffered, read one byte, write one byte, and a
//! monotonic millisecond clock. [`Transport`] captures exactly that, so a
//! serial port, a socket, a pipe or an in-memory buffer can stand in for the
//! hardware stream.

use crate::Result;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

#[cfg(feature = "std")]
use crate::error::PacketError;
#[cfg(feature = "std")]
use std::io::{ErrorKind, Read, Write};

/// Monotonic millisecond time source
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;

    /// Block for `ms` milliseconds
    fn sleep_ms(&self, ms: u64) {
        let start = self.now_ms();
        while self.now_ms().saturating_sub(start) < ms {
            core::hint::spin_loop();
        }
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn sleep_ms(&self, ms: u64) {
        (**self).sleep_ms(ms)
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn sleep_ms(&self, ms: u64) {
        (**self).sleep_ms(ms)
    }
}

/// Wall clock backed by [`std::time::Instant`]
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Clock whose origin is the moment of creation
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep_ms(&self, ms: u64) {
        std::thread::sleep(std::time::Duration::from_millis(ms));
    }
}

/// Simulated clock for deterministic tests
///
/// Every reading returns the current time and then advances it by `step`
/// milliseconds, so a polling loop observes time passing without sleeping.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
    step: u64,
}

impl ManualClock {
    /// Clock frozen at zero until advanced explicitly
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock that advances by `step` ms on each reading
    pub fn with_step(step: u64) -> Self {
        Self {
            now: Cell::new(0),
            step,
        }
    }

    /// Move time forward
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    /// Current time without advancing
    pub fn peek(&self) -> u64 {
        self.now.get()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now.saturating_add(self.step));
        now
    }

    fn sleep_ms(&self, ms: u64) {
        self.advance(ms);
    }
}

/// Byte-oriented link used by the framer and deframer
pub trait Transport {
    /// Number of bytes that can be read without waiting
    fn bytes_available(&mut self) -> Result<usize>;

    /// Read one buffered byte, `None` if nothing is buffered
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Write one byte
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    /// Monotonic milliseconds
    fn millis(&self) -> u64;

    /// Write a run of bytes
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Push buffered writes to the device
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Wait for `ms` milliseconds
    fn delay_ms(&mut self, ms: u64) {
        let start = self.millis();
        while self.millis().saturating_sub(start) < ms {
            core::hint::spin_loop();
        }
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn bytes_available(&mut self) -> Result<usize> {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn millis(&self) -> u64 {
        (**self).millis()
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn delay_ms(&mut self, ms: u64) {
        (**self).delay_ms(ms)
    }
}

/// In-memory transport
///
/// Bytes passed to [`feed`](Self::feed) become readable immediately, bytes
/// passed to [`schedule`](Self::schedule) once the clock reaches their
/// delivery time. Written bytes are recorded and, in loopback mode, also
/// become readable.
#[derive(Debug)]
pub struct MemoryTransport<C> {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    scheduled: VecDeque<(u64, Vec<u8>)>,
    loopback: bool,
    clock: C,
}

#[cfg(feature = "std")]
impl MemoryTransport<SystemClock> {
    /// Transport on the wall clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }

    /// Loopback transport on the wall clock
    pub fn loopback() -> Self {
        Self::loopback_with_clock(SystemClock::new())
    }
}

#[cfg(feature = "std")]
impl Default for MemoryTransport<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryTransport<C> {
    /// Transport driven by `clock`
    pub fn with_clock(clock: C) -> Self {
        Self {
            rx: VecDeque::new(),
            tx: Vec::new(),
            scheduled: VecDeque::new(),
            loopback: false,
            clock,
        }
    }

    /// Loopback transport driven by `clock`
    pub fn loopback_with_clock(clock: C) -> Self {
        let mut transport = Self::with_clock(clock);
        transport.loopback = true;
        transport
    }

    /// Make bytes readable now
    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Make bytes readable once the clock reaches `at_ms`
    pub fn schedule(&mut self, at_ms: u64, bytes: &[u8]) {
        let pos = self
            .scheduled
            .iter()
            .position(|(at, _)| *at > at_ms)
            .unwrap_or(self.scheduled.len());
        self.scheduled.insert(pos, (at_ms, bytes.to_vec()));
    }

    /// Bytes written so far
    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    /// Take and clear the written bytes
    pub fn take_written(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }

    /// Bytes readable now, not counting scheduled deliveries
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// The clock driving this transport
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn release_due(&mut self) {
        if self.scheduled.is_empty() {
            return;
        }
        let now = self.clock.now_ms();
        while let Some((at, _)) = self.scheduled.front() {
            if *at > now {
                break;
            }
            if let Some((_, bytes)) = self.scheduled.pop_front() {
                self.rx.extend(bytes);
            }
        }
    }
}

impl<C: Clock> Transport for MemoryTransport<C> {
    fn bytes_available(&mut self) -> Result<usize> {
        self.release_due();
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.rx.pop_front())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.tx.push(byte);
        if self.loopback {
            self.rx.push_back(byte);
        }
        Ok(())
    }

    fn millis(&self) -> u64 {
        self.clock.now_ms()
    }

    fn delay_ms(&mut self, ms: u64) {
        self.clock.sleep_ms(ms);
    }
}

#[cfg(feature = "std")]
const READ_CHUNK_SIZE: usize = 256;

/// Transport over any `std::io` stream
///
/// The stream must not block indefinitely on reads: put sockets in
/// non-blocking mode or give them a short read timeout. `WouldBlock` and
/// `TimedOut` are treated as "nothing buffered".
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoTransport<S> {
    inner: S,
    rx: VecDeque<u8>,
    clock: SystemClock,
    closed: bool,
}

#[cfg(feature = "std")]
impl<S: Read + Write> IoTransport<S> {
    /// Wrap a stream
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            rx: VecDeque::new(),
            clock: SystemClock::new(),
            closed: false,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consume the transport and return the inner stream.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn fill(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    self.closed = true;
                    break;
                }
                Ok(n) => {
                    self.rx.extend(chunk[..n].iter().copied());
                    if n < chunk.len() {
                        break;
                    }
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    break
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl<S: Read + Write> Transport for IoTransport<S> {
    fn bytes_available(&mut self) -> Result<usize> {
        self.fill()?;
        if self.rx.is_empty() && self.closed {
            return Err(PacketError::Disconnected);
        }
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.rx.is_empty() {
            self.fill()?;
        }
        Ok(self.rx.pop_front())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.inner.write_all(&[byte])?;
        Ok(())
    }

    fn millis(&self) -> u64 {
        self.clock.now_ms()
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    fn delay_ms(&mut self, ms: u64) {
        self.clock.sleep_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_manual_clock_steps() {
        let clock = ManualClock::with_step(5);
        assert_eq!(clock.now_ms(), 0);
        assert_eq!(clock.now_ms(), 5);
        clock.advance(100);
        assert_eq!(clock.peek(), 110);
    }

    #[test]
    fn test_memory_transport_feed_and_write() {
        let mut transport = MemoryTransport::with_clock(ManualClock::new());
        transport.feed(b"ab");
        assert_eq!(transport.bytes_available().unwrap(), 2);
        assert_eq!(transport.read_byte().unwrap(), Some(b'a'));

        transport.write_all(b"xyz").unwrap();
        assert_eq!(transport.written(), b"xyz");
        assert_eq!(transport.bytes_available().unwrap(), 1);
    }

    #[test]
    fn test_loopback_echoes_writes() {
        let mut transport = MemoryTransport::loopback_with_clock(ManualClock::new());
        transport.write_byte(0x42).unwrap();
        assert_eq!(transport.read_byte().unwrap(), Some(0x42));
        assert_eq!(transport.take_written(), vec![0x42]);
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_scheduled_delivery() {
        let clock = Rc::new(ManualClock::new());
        let mut transport = MemoryTransport::with_clock(Rc::clone(&clock));
        transport.schedule(20, b"late");
        transport.schedule(10, b"early");

        assert_eq!(transport.bytes_available().unwrap(), 0);
        clock.advance(10);
        assert_eq!(transport.bytes_available().unwrap(), 5);
        clock.advance(10);
        assert_eq!(transport.bytes_available().unwrap(), 9);
    }

    #[test]
    fn test_io_transport_reports_disconnect_after_eof() {
        let mut transport = IoTransport::new(Cursor::new(b"ok".to_vec()));
        assert_eq!(transport.bytes_available().unwrap(), 2);
        assert_eq!(transport.read_byte().unwrap(), Some(b'o'));
        assert_eq!(transport.read_byte().unwrap(), Some(b'k'));
        assert_eq!(
            transport.bytes_available(),
            Err(PacketError::Disconnected)
        );
    }
}
