use anyhow::{Context, Result};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use upacket_core::{Config, IoTransport, Link, PacketError, Status};

/// Listen on `bind`, accept one peer and echo its packets
pub fn execute(bind: &str, count: Option<usize>, config: &Config) -> Result<usize> {
    let listener =
        TcpListener::bind(bind).with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on {}", listener.local_addr()?);

    let (stream, peer) = listener.accept().context("Failed to accept connection")?;
    info!("Accepted connection from {}", peer);

    serve(stream, count, config)
}

/// Echo every good packet received on `stream` back to the sender
///
/// Stops after `count` packets, or when the peer disconnects. Returns the
/// number of packets echoed.
pub fn serve(stream: TcpStream, count: Option<usize>, config: &Config) -> Result<usize> {
    stream
        .set_nonblocking(true)
        .context("Failed to make socket non-blocking")?;
    stream.set_nodelay(true).ok();

    let mut link = Link::new(IoTransport::new(stream), *config)?;
    let mut buf = [0u8; 32];
    let mut echoed = 0;

    while count.map_or(true, |limit| echoed < limit) {
        let received = match link.receive(&mut buf) {
            Ok(received) => received,
            Err(PacketError::Disconnected) => {
                info!("Peer disconnected");
                break;
            }
            Err(e) => return Err(e).context("Link failed while receiving"),
        };

        match received.status {
            Status::Good => {
                link.send(&buf[..received.len])
                    .context("Failed to echo packet")?;
                echoed += 1;
                info!("Echoed packet {} ({} bytes)", echoed, received.len);
            }
            Status::NoData => thread::sleep(Duration::from_millis(1)),
            status => warn!("Dropped packet: {}", status),
        }
    }

    Ok(echoed)
}
