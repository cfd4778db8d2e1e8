//! Atomic file writer

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::errors::DomainError;

/// Writes whole files through a temporary file in the target directory
pub struct OutputWriter;

impl OutputWriter {
    /// Create a new output writer
    pub fn new() -> Self {
        Self
    }

    /// Replace `path` with `bytes`. Readers see either the old or the new
    /// content, never a partial file.
    pub fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), DomainError> {
        let fail = |message: String| DomainError::PersistenceWriteFailure {
            path: path.display().to_string(),
            message,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| fail(format!("failed to create temporary file: {}", e)))?;
        file.write_all(bytes)
            .map_err(|e| fail(format!("failed to write data: {}", e)))?;
        file.as_file()
            .sync_all()
            .map_err(|e| fail(format!("failed to sync file to disk: {}", e)))?;
        file.persist(path)
            .map_err(|e| fail(format!("failed to rename temporary file: {}", e.error)))?;

        debug!(path = %path.display(), bytes = bytes.len(), "File written");
        Ok(())
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new()
    }
}
