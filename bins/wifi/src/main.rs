//! wifi - Wi-Fi scanning utility.
//!
//! Lists wireless interfaces and PHYs and runs scans via nl80211.

mod commands;

use clap::{Parser, Subcommand};
use wlink::output::{OutputFormat, OutputOptions};

#[derive(Parser)]
#[command(name = "wifi", version, about = "Wi-Fi scanning utility")]
struct Cli {
    /// Output JSON.
    #[arg(short = 'j', long, global = true)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short = 'p', long, global = true)]
    pretty: bool,

    /// Show details.
    #[arg(short = 'd', long, global = true)]
    details: bool,

    /// Show raw frequencies instead of channels.
    #[arg(short = 'n', long, global = true)]
    numeric: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List network interfaces.
    #[command(visible_alias = "i")]
    Interfaces(commands::interfaces::InterfacesCmd),

    /// Show wireless PHYs.
    #[command(visible_alias = "phy")]
    Wiphy(commands::wiphy::WiphyCmd),

    /// Scan for networks.
    #[command(visible_alias = "s")]
    Scan(commands::scan::ScanCmd),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let opts = OutputOptions {
        details: cli.details,
        numeric: cli.numeric,
        pretty: cli.pretty,
    };

    match cli.command {
        Command::Interfaces(cmd) => cmd.run(format, &opts),
        Command::Wiphy(cmd) => cmd.run(format, &opts).await,
        Command::Scan(cmd) => cmd.run(format, &opts).await,
    }
}
