//! Basic encoding example

use upacket_core::{Config, Framer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("uPacket Basic Encoding Example\n");

    let framer = Framer::new(Config::default());

    for payload in ["HELLO", "A|B", "temp=21.5|hum=40", ""] {
        let encoded = framer.encode(payload.as_bytes())?;
        println!("{:<20} -> {}", format!("{:?}", payload), hex::encode(&encoded));
    }

    // 33 bytes cannot be described by the bitmap
    match framer.encode(&[0u8; 33]) {
        Ok(_) => println!("\nUnexpectedly encoded an oversized payload"),
        Err(e) => println!("\nOversized payload rejected: {}", e),
    }

    Ok(())
}
