//! CycleMark CLI
//!
//! Label work segments in long videos and measure cycle times.
//!
//! # Usage
//!
//! ```bash
//! cyclemark inspect --input line3.mp4
//! cyclemark label --input line3.mp4 --speed 2
//! cyclemark stats --input line3.mp4
//! cyclemark export --input line3.mp4 --kind csv
//! cyclemark list --dir recordings/
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use cyclemark_cli::adapters::init_logging;
use cyclemark_cli::app::container::DefaultAppContainer;
use cyclemark_cli::cli::{commands, session, Cli, Commands};
use cyclemark_cli::config_initialization::initialize_configuration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, source) = initialize_configuration(&cli)?;
    init_logging(&config.logging).context("Failed to initialize logging")?;
    info!(source = %source, "Configuration loaded");
    debug!(ffmpeg = %config.tools.ffmpeg, ffprobe = %config.tools.ffprobe, "External tools");

    let container = DefaultAppContainer::new(&config);

    match cli.command {
        Commands::Inspect(args) => commands::inspect(&container, args).await,
        Commands::Label(args) => session::label(&container, &config.playback, args).await,
        Commands::Stats(args) => commands::stats(&container, args).await,
        Commands::Export(args) => commands::export(&container, args).await,
        Commands::List(args) => commands::list(&container, args).await,
        Commands::Config => commands::show_config(&config, &source),
    }
}
