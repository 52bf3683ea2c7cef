use clap::{Parser, Subcommand};

mod commands;
mod display;

use commands::MonitorArgs;

#[derive(Parser)]
#[command(name = "roll-scout")]
#[command(about = "Covered-option roll monitor for Interactive Brokers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor positions on an interval and print roll options
    Monitor(MonitorArgs),
    /// Run a single scan pass and exit
    Scan(MonitorArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Monitor(args) => commands::monitor::run(args, false).await,
        Commands::Scan(args) => commands::monitor::run(args, true).await,
    }
}
