mod archive;
mod bot;
mod cli;
mod config;
mod db;
mod slack;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flashback", version, about = "Slack archive bot with full-text recall")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the archive bot
    Serve,
    /// Search the local archive from the terminal
    Search {
        /// Channel id to search in
        #[arg(long)]
        channel: String,
        /// Restrict results to this sender id
        #[arg(long)]
        sender: Option<String>,
        /// Search keywords
        keywords: Vec<String>,
    },
    /// Check archive health and schema version
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::FlashbackConfig::load()?;

    // Initialize tracing with the configured log level, to stderr
    let filter =
        EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            cli::serve(config).await?;
        }
        Command::Search {
            channel,
            sender,
            keywords,
        } => {
            cli::search(&config, &channel, sender.as_deref(), &keywords)?;
        }
        Command::Doctor => {
            cli::doctor(&config)?;
        }
    }

    Ok(())
}
