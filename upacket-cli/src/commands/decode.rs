use anyhow::{Context, Result};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read};
use tracing::info;
use upacket_core::{scanner::scan_stream_with_stats, Config};

#[derive(Debug, Serialize, Deserialize)]
pub struct RecoveredPacket {
    pub offset: usize,
    pub len: usize,
    pub checksum: String,
    pub hex: String,
    pub text: String,
}

pub fn execute(
    input: &str,
    output: Option<&str>,
    stats_only: bool,
    config: &Config,
) -> Result<Vec<RecoveredPacket>> {
    info!("Decoding file: {}", input);

    // Read input file or stdin
    let data = if input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?
    };

    info!("File size: {} bytes", data.len());

    let (located, stats) = scan_stream_with_stats(config, &data);

    println!("\n=== Decode Results ===");
    println!("Bytes scanned:     {} bytes", stats.bytes_scanned);
    println!("Delimiters tried:  {}", stats.delimiters_tried);
    println!("Good packets:      {}", stats.packets_found.to_string().green());
    if stats.checksum_failures > 0 {
        println!("Checksum failures: {}", stats.checksum_failures.to_string().red());
    } else {
        println!("Checksum failures: {}", stats.checksum_failures);
    }
    println!("Format rejects:    {}", stats.format_failures);
    println!("Recovery rate:     {:.2}%", stats.recovery_rate());
    println!();

    let recovered: Vec<RecoveredPacket> = located
        .iter()
        .map(|lp| RecoveredPacket {
            offset: lp.offset,
            len: lp.packet.len(),
            checksum: format!("{:#06x}", lp.packet.checksum),
            hex: hex::encode(&lp.packet.payload),
            text: String::from_utf8_lossy(&lp.packet.payload).to_string(),
        })
        .collect();

    if stats_only {
        return Ok(recovered);
    }

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&recovered)
            .with_context(|| "Failed to serialize recovered packets")?;

        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;

        info!("Recovered packets written to: {}", output_path);
    } else {
        println!("=== Recovered Packets ===");
        for packet in &recovered {
            println!(
                "@{:<6} {:>2} bytes  {}  {:?}",
                packet.offset, packet.len, packet.checksum, packet.text
            );
        }
    }

    Ok(recovered)
}
