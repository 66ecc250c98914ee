//! VisionPulse CLI
//!
//! Exercises the session cache end to end: upload images to the
//! inference API, review the detected boxes, and keep the session
//! durable across runs.

mod args;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match &cli.command {
        Commands::Upload { files } => commands::upload(&cli.api_url, files).await,
        Commands::Show => commands::show().await,
        Commands::Verify {
            image,
            box_index,
            incorrect,
        } => commands::verify(image, *box_index, !incorrect).await,
        Commands::Validate => commands::validate(&cli.api_url).await,
        Commands::Reset => commands::reset().await,
    }
}
