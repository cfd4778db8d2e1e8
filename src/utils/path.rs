//! Path derivation and video discovery

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::errors::DomainError;

/// Extensions recognized as videos, compared case-insensitively
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov"];

/// Path utilities for files kept next to a video
pub struct PathUtils;

impl PathUtils {
    /// Create a new path utils instance
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PathUtils {
    fn default() -> Self {
        Self::new()
    }
}

impl PathUtils {
    /// Append a suffix to the full file name: `cam.mp4` + `.labels.json`
    /// gives `cam.mp4.labels.json`
    pub fn with_suffix(&self, path: &Path, suffix: &str) -> PathBuf {
        let mut name: OsString = path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Final component of a path as text
    pub fn file_name(&self, path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned())
    }

    /// Absolute form of a path, falling back to the path itself
    pub fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Whether the file extension is a known video type
    pub fn is_video_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Videos directly inside `dir`, sorted by file name
    pub fn list_videos(&self, dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
        if !dir.is_dir() {
            return Err(DomainError::BadArgs(format!(
                "Not a directory: {}",
                dir.display()
            )));
        }

        let mut videos = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                DomainError::BadArgs(format!("Failed to read {}: {}", dir.display(), e))
            })?;
            if entry.file_type().is_file() && self.is_video_file(entry.path()) {
                videos.push(entry.into_path());
            }
        }
        videos.sort_by_key(|path| self.file_name(path));
        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_suffix_keeps_extension() {
        let utils = PathUtils::new();
        assert_eq!(
            utils.with_suffix(Path::new("/data/cam 1.mp4"), ".labels.json"),
            PathBuf::from("/data/cam 1.mp4.labels.json")
        );
    }

    #[test]
    fn test_is_video_file() {
        let utils = PathUtils::new();
        assert!(utils.is_video_file(Path::new("a.MP4")));
        assert!(utils.is_video_file(Path::new("b.mkv")));
        assert!(!utils.is_video_file(Path::new("a.mp4.labels.json")));
        assert!(!utils.is_video_file(Path::new("noext")));
    }

    #[test]
    fn test_list_videos_sorted_and_flat() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mov", "a.mp4", "notes.txt", "a.mp4.labels.json"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.mp4"), b"").unwrap();

        let utils = PathUtils::new();
        let names: Vec<String> = utils
            .list_videos(dir.path())
            .unwrap()
            .iter()
            .map(|p| utils.file_name(p))
            .collect();
        assert_eq!(names, vec!["a.mp4", "b.mov"]);
    }

    #[test]
    fn test_list_videos_rejects_missing_dir() {
        assert!(PathUtils::new()
            .list_videos(Path::new("/no/such/dir"))
            .is_err());
    }
}
