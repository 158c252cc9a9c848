use anyhow::{Context, Result};
use colored::*;
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use upacket_core::{Config, IoTransport, Link, Status};

/// Send one packet over TCP and optionally wait for one reply
///
/// Returns the reply payload when one arrived within `wait_ms`.
pub fn execute(
    addr: &str,
    payload: &[u8],
    await_reply: bool,
    wait_ms: u64,
    config: &Config,
) -> Result<Option<Vec<u8>>> {
    info!("Connecting to {}", addr);

    let stream =
        TcpStream::connect(addr).with_context(|| format!("Failed to connect to {}", addr))?;
    stream
        .set_nonblocking(true)
        .context("Failed to make socket non-blocking")?;
    stream.set_nodelay(true).ok();

    let mut link = Link::begin(IoTransport::new(stream), *config)
        .with_context(|| format!("Failed to open link to {}", addr))?;

    link.send(payload)
        .with_context(|| format!("Failed to send {} byte payload", payload.len()))?;
    println!("{} Sent {} bytes", "→".green(), payload.len());

    if !await_reply {
        return Ok(None);
    }

    let deadline = Instant::now() + Duration::from_millis(wait_ms);
    let mut buf = [0u8; 32];

    while Instant::now() < deadline {
        let received = link.receive(&mut buf).context("Link failed while waiting for reply")?;
        match received.status {
            Status::Good => {
                let reply = buf[..received.len].to_vec();
                println!(
                    "{} Received {} bytes: {:?}",
                    "←".green(),
                    reply.len(),
                    String::from_utf8_lossy(&reply)
                );
                return Ok(Some(reply));
            }
            Status::NoData => thread::sleep(Duration::from_millis(1)),
            status => {
                warn!("Discarding reply attempt: {} (code {})", status, status.code());
            }
        }
    }

    debug!("No reply within {} ms", wait_ms);
    println!("{} No reply within {} ms", "✗".red(), wait_ms);

    Ok(None)
}
