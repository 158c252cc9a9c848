//! Integration tests for the complete send → wire → receive flow

use std::rc::Rc;
use std::time::{Duration, Instant};

use upacket_core::{
    checksum, encode_frame, Config, Deframer, Framer, Link, ManualClock, MemoryTransport,
    PacketError, Received, Status, Transport,
};

#[test]
fn test_hello_end_to_end() {
    let config = Config::default();
    let mut sender = MemoryTransport::with_clock(ManualClock::with_step(1));
    Framer::new(config).send(&mut sender, b"HELLO").unwrap();

    let crc = checksum(b"HELLO").to_be_bytes();
    let expected = [
        0x7C, crc[0], crc[1], 0x00, 0x00, 0x00, 0x00, 0x48, 0x45, 0x4C, 0x4C, 0x4F, 0x7C,
    ];
    assert_eq!(sender.written(), &expected);
    assert_eq!(hex::encode(sender.written()), "7c58da0000000048454c4c4f7c");

    let mut receiver = MemoryTransport::with_clock(ManualClock::with_step(1));
    receiver.feed(sender.written());
    let mut buf = [0u8; 32];
    let received = Deframer::new(config).receive(&mut receiver, &mut buf).unwrap();

    assert_eq!(received.status, Status::Good);
    assert_eq!(received.payload(&buf), Some(&b"HELLO"[..]));
}

#[test]
fn test_loopback_every_length() {
    let transport = MemoryTransport::loopback_with_clock(ManualClock::with_step(1));
    let mut link = Link::new(transport, Config::default()).unwrap();
    let mut buf = [0u8; 32];

    for len in 0..=32usize {
        let payload: Vec<u8> = (0..len).map(|i| [b'|', b'+', i as u8][i % 3]).collect();
        link.send(&payload).unwrap();

        let received = link.receive(&mut buf).unwrap();
        assert_eq!(received, Received::good(len), "length {}", len);
        assert_eq!(&buf[..len], payload.as_slice());
    }
}

#[test]
fn test_idle_returns_no_data_without_waiting() {
    let mut transport = MemoryTransport::new();
    let mut buf = [0u8; 32];

    let start = Instant::now();
    let received = Deframer::default().receive(&mut transport, &mut buf).unwrap();

    assert_eq!(received.status, Status::NoData);
    assert!(start.elapsed() < Duration::from_millis(10));
}

#[test]
fn test_delimiter_then_silence_times_out_on_wall_clock() {
    let mut transport = MemoryTransport::new();
    transport.feed(b"|");
    let mut buf = [0u8; 32];

    let start = Instant::now();
    let received = Deframer::default().receive(&mut transport, &mut buf).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(received.status, Status::Timeout);
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_millis(500));
}

#[test]
fn test_noise_then_silence_times_out() {
    let config = Config::builder().timeout_ms(20).build().unwrap();
    let mut transport = MemoryTransport::new();
    transport.feed(b"\x00\xFFgarbage");
    let mut buf = [0u8; 32];

    let start = Instant::now();
    let received = Deframer::new(config).receive(&mut transport, &mut buf).unwrap();

    assert_eq!(received.status, Status::Timeout);
    assert!(start.elapsed() >= Duration::from_millis(20));
}

#[test]
fn test_oversize_is_invalid_and_bounded() {
    let mut transport = MemoryTransport::with_clock(ManualClock::with_step(1));
    transport.feed(&encode_frame(&Config::default(), &[b'x'; 20]).unwrap());

    let mut backing = [0xAAu8; 16];
    let received = Deframer::default()
        .receive(&mut transport, &mut backing[..10])
        .unwrap();

    assert_eq!(received.status, Status::InvalidFormat);
    assert!(backing[10..].iter().all(|&b| b == 0xAA));
}

#[test]
fn test_flipped_checksum_bytes_detected() {
    let frame = encode_frame(&Config::default(), b"telemetry:17").unwrap();

    for index in [1usize, 2] {
        for mask in [0x01u8, 0x80, 0xFF] {
            let mut damaged = frame.to_vec();
            damaged[index] ^= mask;

            let mut transport = MemoryTransport::with_clock(ManualClock::with_step(1));
            transport.feed(&damaged);
            let mut buf = [0u8; 32];
            let received = Deframer::default().receive(&mut transport, &mut buf).unwrap();

            assert_eq!(
                received.status,
                Status::ChecksumMismatch,
                "byte {} mask {:#04x}",
                index,
                mask
            );
        }
    }
}

#[test]
fn test_late_delivery_within_deadline() {
    let clock = Rc::new(ManualClock::with_step(1));
    let mut transport = MemoryTransport::with_clock(Rc::clone(&clock));
    let frame = encode_frame(&Config::default(), b"slow").unwrap();
    transport.feed(&frame[..3]);
    transport.schedule(30, &frame[3..]);
    let mut buf = [0u8; 32];

    let received = Deframer::default().receive(&mut transport, &mut buf).unwrap();
    assert_eq!(received.payload(&buf), Some(&b"slow"[..]));
}

#[test]
fn test_delivery_after_deadline_fails() {
    let clock = Rc::new(ManualClock::with_step(1));
    let mut transport = MemoryTransport::with_clock(Rc::clone(&clock));
    let frame = encode_frame(&Config::default(), b"slow").unwrap();
    transport.feed(&frame[..3]);
    transport.schedule(200, &frame[3..]);
    let mut buf = [0u8; 32];

    let received = Deframer::default().receive(&mut transport, &mut buf).unwrap();
    assert_eq!(received.status, Status::InvalidFormat);
    assert!(clock.peek() < 200);
}

#[test]
fn test_custom_delimiter() {
    let config = Config::builder()
        .delimiter(0x7E)
        .placeholder(0x7D)
        .build()
        .unwrap();
    let transport = MemoryTransport::loopback_with_clock(ManualClock::with_step(1));
    let mut link = Link::new(transport, config).unwrap();
    let payload = [0x7E, 0x00, 0x7C, 0x7D, 0x7E];
    let mut buf = [0u8; 32];

    link.send(&payload).unwrap();
    let written = link.get_ref().written();
    assert_eq!(&written[7..12], &[0x7D, 0x00, 0x7C, 0x7D, 0x7D]);
    assert_eq!(written[12], 0x7E);

    let received = link.receive(&mut buf).unwrap();
    assert_eq!(received.payload(&buf), Some(&payload[..]));
}

#[test]
fn test_send_too_large() {
    let transport = MemoryTransport::with_clock(ManualClock::new());
    let mut link = Link::new(transport, Config::default()).unwrap();

    let err = link.send(&[0u8; 33]).unwrap_err();
    assert_eq!(err, PacketError::PayloadTooLarge { len: 33, max: 32 });
    assert_eq!(err.status(), Some(Status::InvalidFormat));
    assert_eq!(link.get_mut().bytes_available().unwrap(), 0);
}

#[cfg(unix)]
#[test]
fn test_io_transport_over_socket_pair() {
    use std::os::unix::net::UnixStream;
    use upacket_core::IoTransport;

    let (left, right) = UnixStream::pair().unwrap();
    left.set_nonblocking(true).unwrap();
    right.set_nonblocking(true).unwrap();

    let config = Config::builder().timeout_ms(500).build().unwrap();
    let mut a = Link::new(IoTransport::new(left), config).unwrap();
    let mut b = Link::new(IoTransport::new(right), config).unwrap();

    a.send(b"over|socket").unwrap();

    let mut buf = [0u8; 32];
    let deadline = Instant::now() + Duration::from_secs(2);
    let received = loop {
        let received = b.receive(&mut buf).unwrap();
        if received.status != Status::NoData || Instant::now() > deadline {
            break received;
        }
    };

    assert_eq!(received.payload(&buf), Some(&b"over|socket"[..]));
}

#[test]
fn test_packet_before_hangup_is_delivered() {
    use std::io::Cursor;
    use upacket_core::IoTransport;

    let wire = encode_frame(&Config::default(), b"last words").unwrap();
    let mut deframer = Deframer::default();
    let mut transport = IoTransport::new(Cursor::new(wire.to_vec()));
    let mut buf = [0u8; 32];

    let received = deframer.receive(&mut transport, &mut buf).unwrap();
    assert_eq!(received.payload(&buf), Some(&b"last words"[..]));

    let err = deframer.receive(&mut transport, &mut buf).unwrap_err();
    assert_eq!(err, PacketError::Disconnected);
}
