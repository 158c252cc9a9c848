use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use upacket_cli::{commands, LinkArgs};

#[derive(Parser)]
#[command(name = "upacket")]
#[command(about = "uPacket - delimiter-framed packets for serial links", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    link: LinkArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode payloads into a wire file
    Encode {
        /// Input JSON file (array of strings, byte arrays or JSON values)
        #[arg(short, long)]
        input: String,

        /// Output file for encoded frames
        #[arg(short, long)]
        output: String,
    },

    /// Decode frames from a wire file or capture
    Decode {
        /// Input file to decode ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Output JSON file for recovered packets
        #[arg(short, long)]
        output: Option<String>,

        /// Show statistics only
        #[arg(long)]
        stats_only: bool,
    },

    /// Compute the CRC-16/XMODEM checksum of a payload
    Checksum {
        /// Payload as text
        #[arg(long, conflicts_with = "hex")]
        text: Option<String>,

        /// Payload as hex
        #[arg(long)]
        hex: Option<String>,
    },

    /// Send one packet over TCP
    Send {
        /// Peer address (host:port)
        #[arg(short, long)]
        addr: String,

        /// Payload as text
        #[arg(long, conflicts_with = "hex")]
        text: Option<String>,

        /// Payload as hex
        #[arg(long)]
        hex: Option<String>,

        /// Wait for one reply packet
        #[arg(long)]
        await_reply: bool,

        /// How long to wait for the reply, in milliseconds
        #[arg(long, default_value = "1000")]
        wait_ms: u64,
    },

    /// Accept one TCP peer and echo its packets back
    Echo {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:1336")]
        bind: String,

        /// Stop after this many packets
        #[arg(long)]
        count: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = cli.link.resolve()?;

    // Execute command
    match cli.command {
        Commands::Encode { input, output } => {
            commands::encode::execute(&input, &output, &config).map(|_| ())
        }

        Commands::Decode {
            input,
            output,
            stats_only,
        } => commands::decode::execute(&input, output.as_deref(), stats_only, &config).map(|_| ()),

        Commands::Checksum { text, hex } => {
            commands::checksum::execute(text.as_deref(), hex.as_deref()).map(|_| ())
        }

        Commands::Send {
            addr,
            text,
            hex,
            await_reply,
            wait_ms,
        } => {
            let payload = commands::payload_from_args(text.as_deref(), hex.as_deref())?;
            commands::send::execute(&addr, &payload, await_reply, wait_ms, &config).map(|_| ())
        }

        Commands::Echo { bind, count } => {
            commands::echo::execute(&bind, count, &config).map(|_| ())
        }
    }
}
