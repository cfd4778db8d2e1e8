//! Command implementations

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::TomlConfigAdapter;
use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::inspect_interactor::InspectFormat;
use crate::app::study_interactor::ExportKind;
use crate::cli::args::{ExportArgs, InspectArgs, ListArgs, StatsArgs};
use crate::config::StudyConfig;
use crate::config_initialization::ConfigSource;
use crate::domain::model::format_clock;
use crate::output::report::render_stats;

/// Execute the inspect command
pub async fn inspect(container: &DefaultAppContainer, args: InspectArgs) -> Result<()> {
    let format = InspectFormat::parse(&args.format)
        .map_err(|e| anyhow::anyhow!("Invalid format '{}': {}", args.format, e))?;

    let response = container
        .inspect_interactor()
        .execute(&args.input, format)
        .await
        .with_context(|| format!("Failed to inspect {}", args.input.display()))?;

    print!("{}", response.summary);
    if !response.summary.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Execute the stats command
pub async fn stats(container: &DefaultAppContainer, args: StatsArgs) -> Result<()> {
    let snapshot = container
        .study_interactor()
        .load(&args.input)
        .await
        .with_context(|| format!("Failed to read labels for {}", args.input.display()))?;

    for warning in &snapshot.warnings {
        warn!("{}", warning);
    }

    println!("Video            : {}", snapshot.video_file);
    println!(
        "Duration         : {} ({:.2} fps, {} frames)",
        format_clock(snapshot.duration),
        snapshot.frame_rate,
        snapshot.frame_count
    );
    print!(
        "{}",
        render_stats(&snapshot.summary(), snapshot.cycle_report().as_ref())
    );
    Ok(())
}

/// Execute the export command
pub async fn export(container: &DefaultAppContainer, args: ExportArgs) -> Result<()> {
    let kind = ExportKind::parse(&args.kind)
        .map_err(|e| anyhow::anyhow!("Invalid export kind '{}': {}", args.kind, e))?;

    let study = container.study_interactor();
    let snapshot = study
        .load(&args.input)
        .await
        .with_context(|| format!("Failed to read labels for {}", args.input.display()))?;

    let written = study
        .export(&snapshot.video_path, &snapshot.segments, snapshot.duration, kind)
        .context("Export failed")?;

    for path in written {
        println!("Written: {}", path.display());
    }
    Ok(())
}

/// Execute the list command
pub async fn list(container: &DefaultAppContainer, args: ListArgs) -> Result<()> {
    let entries = container
        .study_interactor()
        .list(&args.dir)
        .await
        .with_context(|| format!("Failed to list {}", args.dir.display()))?;

    info!(dir = %args.dir.display(), videos = entries.len(), "Videos listed");
    if entries.is_empty() {
        println!("No videos found in {}", args.dir.display());
        return Ok(());
    }

    for entry in entries {
        match entry.label_count {
            Some(count) => println!("{:<40} {} labels", entry.file_name, count),
            None => println!("{:<40} -", entry.file_name),
        }
    }
    Ok(())
}

/// Execute the config command
pub fn show_config(config: &StudyConfig, source: &ConfigSource) -> Result<()> {
    let rendered = TomlConfigAdapter::new()
        .render(config)
        .context("Failed to render configuration")?;
    println!("# loaded from {}", source);
    print!("{}", rendered);
    Ok(())
}
