// TOML config adapter - Study configuration from TOML files

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::StudyConfig;
use crate::domain::errors::*;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "cyclemark.toml";

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Create new TOML config adapter
    pub fn new() -> Self {
        Self
    }

    /// Default config file path
    pub fn default_config_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Parse TOML text over the built-in defaults
    pub fn parse(&self, toml_content: &str) -> Result<StudyConfig, DomainError> {
        toml::from_str(toml_content)
            .map_err(|e| DomainError::ConfigError(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load a config file
    pub fn load(&self, file_path: &Path) -> Result<StudyConfig, DomainError> {
        let content = std::fs::read_to_string(file_path).map_err(|e| {
            DomainError::ConfigError(format!(
                "Failed to read config file {}: {}",
                file_path.display(),
                e
            ))
        })?;
        debug!(path = %file_path.display(), "Config file read");
        self.parse(&content)
    }

    /// Serialize a config, e.g. to print the effective settings
    pub fn render(&self, config: &StudyConfig) -> Result<String, DomainError> {
        toml::to_string_pretty(config)
            .map_err(|e| DomainError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let adapter = TomlConfigAdapter::new();
        let config = adapter
            .parse(
                r#"
                [playback]
                speed = 2.0

                [tools]
                ffprobe = "/usr/local/bin/ffprobe"
                "#,
            )
            .unwrap();

        assert_eq!(config.playback.speed, 2.0);
        assert_eq!(config.playback.stop_timeout_ms, 2000);
        assert_eq!(config.tools.ffprobe, "/usr/local/bin/ffprobe");
        assert_eq!(config.tools.ffmpeg, "ffmpeg");
        assert_eq!(config.storage.csv_suffix, ".labels.csv");
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let config = TomlConfigAdapter::new().parse("").unwrap();
        assert_eq!(config, StudyConfig::default());
    }

    #[test]
    fn test_type_errors_are_config_errors() {
        let result = TomlConfigAdapter::new().parse("[playback]\nspeed = \"fast\"\n");
        assert!(matches!(result, Err(DomainError::ConfigError(_))));
    }

    #[test]
    fn test_render_round_trips() {
        let adapter = TomlConfigAdapter::new();
        let mut config = StudyConfig::default();
        config.logging.json = true;
        let text = adapter.render(&config).unwrap();
        assert_eq!(adapter.parse(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let result = TomlConfigAdapter::new().load(Path::new("/no/such/cyclemark.toml"));
        assert!(matches!(result, Err(DomainError::ConfigError(_))));
    }
}
