//! Configuration initialization and hierarchy management

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::adapters::TomlConfigAdapter;
use crate::cli::{Cli, Commands};
use crate::config::StudyConfig;

/// Where the file layer of the configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Defaults => f.write_str("built-in defaults"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(cli: &Cli) -> Result<(StudyConfig, ConfigSource)> {
    resolve_configuration(
        cli,
        |name| std::env::var(name).ok(),
        &TomlConfigAdapter::default_config_path(),
    )
}

/// Build the configuration from explicit inputs.
///
/// `default_path` is only read when it exists; a `--config` path must exist.
pub fn resolve_configuration<F>(
    cli: &Cli,
    env: F,
    default_path: &Path,
) -> Result<(StudyConfig, ConfigSource)>
where
    F: Fn(&str) -> Option<String>,
{
    let adapter = TomlConfigAdapter::new();

    let (mut config, source) = match &cli.config {
        Some(path) => {
            let config = adapter
                .load(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
            (config, ConfigSource::File(path.clone()))
        }
        None if default_path.is_file() => {
            let config = adapter.load(default_path).with_context(|| {
                format!("Failed to load config file {}", default_path.display())
            })?;
            (config, ConfigSource::File(default_path.to_path_buf()))
        }
        None => (StudyConfig::default(), ConfigSource::Defaults),
    };

    config
        .apply_env(env)
        .context("Invalid environment override")?;

    if let Some(level) = &cli.log_level {
        config.logging.level = level.trim().to_lowercase();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    if let Commands::Label(args) = &cli.command {
        if let Some(speed) = args.speed {
            config.playback.speed = speed;
        }
    }

    config.validate().context("Invalid configuration")?;
    Ok((config, source))
}
