//! Time parsing for seek commands

use crate::domain::errors::DomainError;
use crate::domain::model::TimeSpec;

/// Time parser for absolute positions and signed offsets
pub struct TimeParser;

impl TimeParser {
    /// Create a new time parser
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeParser {
    /// Parse an absolute position: seconds, MM:SS(.ms) or HH:MM:SS(.ms)
    pub fn parse_time(&self, time_str: &str) -> Result<f64, DomainError> {
        TimeSpec::parse(time_str).map(|t| t.as_seconds())
    }

    /// Parse a relative offset such as `5`, `+5`, `-2.5` or `-1:30`
    pub fn parse_offset(&self, offset_str: &str) -> Result<f64, DomainError> {
        let trimmed = offset_str.trim();
        let (sign, magnitude) = match trimmed.strip_prefix('-') {
            Some(rest) => (-1.0, rest),
            None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if magnitude.starts_with(['+', '-']) {
            return Err(DomainError::BadArgs(format!(
                "Invalid offset: {}",
                trimmed
            )));
        }
        Ok(sign * self.parse_time(magnitude)?)
    }
}
