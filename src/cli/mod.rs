//! CLI module for CycleMark
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;
pub mod session;

/// CycleMark time study labeler
///
/// Label value-adding work and other activity in long videos and measure
/// cycle times from the labels.
#[derive(Parser, Debug)]
#[command(name = "cyclemark")]
#[command(about = "CycleMark - Video labeling and cycle-time analysis for time studies")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./cyclemark.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show video stream information
    Inspect(args::InspectArgs),
    /// Label a video interactively from stdin commands
    Label(args::LabelArgs),
    /// Print statistics from a video's saved labels
    Stats(args::StatsArgs),
    /// Write the CSV export and/or report from saved labels
    Export(args::ExportArgs),
    /// List videos in a directory with their label counts
    List(args::ListArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cyclemark",
            "stats",
            "--input",
            "cam.mp4",
            "--log-level",
            "debug",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.json_logs);
        assert!(matches!(cli.command, Commands::Stats(_)));
    }

    #[test]
    fn test_label_speed_flag() {
        let cli = Cli::try_parse_from(["cyclemark", "label", "-i", "cam.mp4", "--speed", "2"]).unwrap();
        match cli.command {
            Commands::Label(args) => assert_eq!(args.speed, Some(2.0)),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
