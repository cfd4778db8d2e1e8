//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Arguments for the label command
#[derive(Args, Debug)]
pub struct LabelArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Initial playback speed factor (overrides configuration)
    #[arg(long)]
    pub speed: Option<f64>,
}

/// Arguments for the stats command
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Video whose label file is read
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Video whose label file is read
    #[arg(short, long)]
    pub input: PathBuf,

    /// What to write (csv, report, all)
    #[arg(short, long, default_value = "all")]
    pub kind: String,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Directory to scan
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,
}
