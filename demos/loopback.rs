//! Loopback example: send packets to ourselves and poll them back

use upacket_core::{Config, Link, MemoryTransport, Poll, Status};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("uPacket Loopback Example\n");

    let config = Config::builder().settle_ms(0).build()?;
    let mut link = Link::begin(MemoryTransport::loopback(), config)?;
    let mut buf = [0u8; 32];

    // Blocking receive
    link.send(b"ping|1")?;
    let received = link.receive(&mut buf)?;
    println!(
        "receive -> {} {:?}",
        received.status,
        received.payload(&buf).map(String::from_utf8_lossy)
    );

    // Cooperative polling
    link.send(b"ping|2")?;
    loop {
        match link.poll_receive(&mut buf)? {
            Poll::Pending => std::thread::yield_now(),
            Poll::Ready(received) => {
                println!(
                    "poll    -> {} {:?}",
                    received.status,
                    received.payload(&buf).map(String::from_utf8_lossy)
                );
                break;
            }
        }
    }

    // Nothing left to read
    let received = link.receive(&mut buf)?;
    assert_eq!(received.status, Status::NoData);
    println!("receive -> {} (code {})", received.status, received.status.code());

    Ok(())
}
