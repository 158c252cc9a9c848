use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use tracing::info;
use upacket_core::{constants::MAX_PAYLOAD_LEN, Config, Framer};

/// Bytes carried by one JSON input value
///
/// Strings are sent as UTF-8, arrays of integers as raw bytes, anything else
/// as its compact JSON text.
fn payload_bytes(value: &Value) -> Result<Vec<u8>> {
    match value {
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        Value::Array(items) if items.iter().all(Value::is_u64) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .with_context(|| format!("Byte value out of range: {}", item))
            })
            .collect(),
        other => serde_json::to_vec(other).context("Failed to serialize payload"),
    }
}

pub fn execute(input: &str, output: &str, config: &Config) -> Result<usize> {
    info!("Encoding payloads from {} to {}", input, output);

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input))?;

    let payloads: Vec<Value> =
        serde_json::from_str(&content).with_context(|| "Failed to parse JSON input")?;

    info!("Found {} payloads to encode", payloads.len());

    let framer = Framer::new(*config);
    let mut output_data = Vec::new();

    for (i, value) in payloads.iter().enumerate() {
        let payload = payload_bytes(value).with_context(|| format!("Payload {}", i))?;
        if payload.len() > MAX_PAYLOAD_LEN {
            bail!(
                "Payload {} is {} bytes; packets carry at most {} bytes",
                i,
                payload.len(),
                MAX_PAYLOAD_LEN
            );
        }

        let encoded = framer
            .encode(&payload)
            .with_context(|| format!("Failed to encode payload {}", i))?;
        output_data.extend_from_slice(&encoded);

        info!("Encoded payload {} ({} bytes on the wire)", i, encoded.len());
    }

    fs::write(output, &output_data)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    info!(
        "Successfully encoded {} packets ({} bytes total)",
        payloads.len(),
        output_data.len()
    );

    Ok(payloads.len())
}
