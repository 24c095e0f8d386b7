//! Sentiscope CLI
//!
//! Classifies single texts, runs bulk CSV jobs and manages the stored
//! history of both.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod cli;
mod commands;
mod config;

use cli::Cli;
use config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config = AppConfig::load(&cli.config, cli.data_dir.as_deref())?;
    debug!(
        data_dir = %config.data_dir.display(),
        chunk_size = config.classifier.chunk_size,
        max_items = config.classifier.max_items,
        "Configuration loaded"
    );

    commands::run(cli.command, &config)
}

fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("sentiscope=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sentiscope=info"))
    };

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}
