//! Study configuration
//!
//! Every section defaults independently, so a TOML file only needs the keys
//! it changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::engine::frame_source::FrameSourceOptions;
use crate::engine::playback::validate_speed;

/// Recognized log levels
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub tools: ToolsConfig,
    pub playback: PlaybackConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// External programs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial speed factor
    pub speed: f64,
    /// Graceful bound on stopping a decoder stream
    pub stop_timeout_ms: u64,
    /// Bound on a single-frame seek decode
    pub decode_timeout_ms: u64,
    /// Seeks clamp to `duration - end_guard_secs`
    pub end_guard_secs: f64,
    pub short_seek_secs: f64,
    pub long_seek_secs: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            stop_timeout_ms: 2000,
            decode_timeout_ms: 10_000,
            end_guard_secs: 0.1,
            short_seek_secs: 5.0,
            long_seek_secs: 30.0,
        }
    }
}

impl PlaybackConfig {
    pub fn frame_source_options(&self) -> FrameSourceOptions {
        FrameSourceOptions {
            stop_timeout: Duration::from_millis(self.stop_timeout_ms),
            decode_timeout: Duration::from_millis(self.decode_timeout_ms),
            end_guard_secs: self.end_guard_secs,
        }
    }
}

/// Suffixes appended to the video path for derived files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub sidecar_suffix: String,
    pub csv_suffix: String,
    pub report_suffix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sidecar_suffix: ".labels.json".to_string(),
            csv_suffix: ".labels.csv".to_string(),
            report_suffix: ".report.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl StudyConfig {
    /// Apply `CYCLEMARK_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;

        if let Some(level) = lookup("CYCLEMARK_LOG_LEVEL") {
            self.logging.level = level.trim().to_lowercase();
            applied += 1;
        }
        if let Some(program) = lookup("CYCLEMARK_FFMPEG") {
            self.tools.ffmpeg = program;
            applied += 1;
        }
        if let Some(program) = lookup("CYCLEMARK_FFPROBE") {
            self.tools.ffprobe = program;
            applied += 1;
        }
        if let Some(speed) = lookup("CYCLEMARK_SPEED") {
            self.playback.speed = speed.trim().parse().map_err(|_| {
                DomainError::ConfigError(format!("CYCLEMARK_SPEED is not a number: {}", speed))
            })?;
            applied += 1;
        }
        if let Some(timeout) = lookup("CYCLEMARK_STOP_TIMEOUT_MS") {
            self.playback.stop_timeout_ms = timeout.trim().parse().map_err(|_| {
                DomainError::ConfigError(format!(
                    "CYCLEMARK_STOP_TIMEOUT_MS is not a whole number: {}",
                    timeout
                ))
            })?;
            applied += 1;
        }

        Ok(applied)
    }

    /// Check ranges and names
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_speed(self.playback.speed)
            .map_err(|e| DomainError::ConfigError(format!("playback.speed: {}", e)))?;

        for (name, value) in [
            ("stop_timeout_ms", self.playback.stop_timeout_ms),
            ("decode_timeout_ms", self.playback.decode_timeout_ms),
        ] {
            if value == 0 {
                return Err(DomainError::ConfigError(format!(
                    "playback.{} must be greater than zero",
                    name
                )));
            }
        }
        if !self.playback.end_guard_secs.is_finite() || self.playback.end_guard_secs < 0.0 {
            return Err(DomainError::ConfigError(
                "playback.end_guard_secs cannot be negative".to_string(),
            ));
        }
        for (name, step) in [
            ("short_seek_secs", self.playback.short_seek_secs),
            ("long_seek_secs", self.playback.long_seek_secs),
        ] {
            if !step.is_finite() || step <= 0.0 {
                return Err(DomainError::ConfigError(format!(
                    "playback.{} must be positive",
                    name
                )));
            }
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(DomainError::ConfigError(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }
        if self.tools.ffmpeg.trim().is_empty() || self.tools.ffprobe.trim().is_empty() {
            return Err(DomainError::ConfigError(
                "tools.ffmpeg and tools.ffprobe cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = StudyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.sidecar_suffix, ".labels.json");
        assert_eq!(
            config.playback.frame_source_options().stop_timeout,
            Duration::from_secs(2)
        );
        assert_eq!(
            config.playback.frame_source_options().decode_timeout,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CYCLEMARK_LOG_LEVEL", "DEBUG"),
            ("CYCLEMARK_SPEED", "2"),
            ("CYCLEMARK_FFMPEG", "/opt/ffmpeg"),
        ]
        .into_iter()
        .collect();

        let mut config = StudyConfig::default();
        let applied = config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(applied, 3);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.playback.speed, 2.0);
        assert_eq!(config.tools.ffmpeg, "/opt/ffmpeg");
        assert_eq!(config.tools.ffprobe, "ffprobe");
    }

    #[test]
    fn test_env_rejects_bad_numbers() {
        let mut config = StudyConfig::default();
        let result = config.apply_env(|key| {
            (key == "CYCLEMARK_STOP_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(DomainError::ConfigError(_))));
    }

    #[test]
    fn test_validation_ranges() {
        let mut config = StudyConfig::default();
        config.playback.speed = 32.0;
        assert!(config.validate().is_err());

        let mut config = StudyConfig::default();
        config.playback.stop_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = StudyConfig::default();
        config.playback.decode_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = StudyConfig::default();
        config.playback.end_guard_secs = -0.5;
        assert!(config.validate().is_err());

        let mut config = StudyConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }
}
