use anyhow::Result;
use tracing::info;

use super::payload_from_args;

pub fn execute(text: Option<&str>, hex: Option<&str>) -> Result<u16> {
    let data = payload_from_args(text, hex)?;
    info!("Computing CRC-16/XMODEM over {} bytes", data.len());

    let crc = upacket_core::checksum(&data);
    println!("{:#06X}", crc);

    Ok(crc)
}
