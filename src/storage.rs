//! Storage layer for rollout
//!
//! Mirrors application state into a directory of JSON files, one per key:
//!
//! ```text
//! <state dir>/
//!   rollout.toml              # Optional configuration
//!   categoryColors.json       # category -> "#rrggbb"
//!   subtaskProgress.json      # task id -> subtask id -> bool
//!   overrides.json            # field overrides, deletions, custom tasks
//! ```
//!
//! Every file is read once at startup. A missing or malformed file yields the
//! default value for that key; partial parses are never kept.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};

use crate::config::CONFIG_FILE;
use crate::error::{Error, Result};
use crate::lock::{write_atomic_locked, DEFAULT_LOCK_TIMEOUT_MS};
use crate::overrides::OverrideStore;
use crate::progress::ProgressStore;
use crate::theme::CategoryColors;

pub const COLORS_FILE: &str = "categoryColors.json";
pub const PROGRESS_FILE: &str = "subtaskProgress.json";
pub const OVERRIDES_FILE: &str = "overrides.json";

/// Where a state file's value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    File,
    Missing,
    Malformed,
}

#[derive(Debug, Clone)]
pub struct Storage {
    state_dir: PathBuf,
}

impl Storage {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    /// Explicit dir, or the platform data dir for `rollout`
    pub fn resolve(state_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = state_dir {
            return Ok(Self::new(dir));
        }
        let dirs = ProjectDirs::from("", "", "rollout").ok_or_else(|| {
            Error::OperationFailed(
                "cannot determine a data directory; pass --state-dir".to_string(),
            )
        })?;
        Ok(Self::new(dirs.data_dir().to_path_buf()))
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.state_dir.join(CONFIG_FILE)
    }

    pub fn colors_file(&self) -> PathBuf {
        self.state_dir.join(COLORS_FILE)
    }

    pub fn progress_file(&self) -> PathBuf {
        self.state_dir.join(PROGRESS_FILE)
    }

    pub fn overrides_file(&self) -> PathBuf {
        self.state_dir.join(OVERRIDES_FILE)
    }

    // =========================================================================
    // JSON helpers
    // =========================================================================

    /// Write pretty JSON atomically under the file's lock
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        write_atomic_locked(path, json.as_bytes(), DEFAULT_LOCK_TIMEOUT_MS)
    }

    /// Read JSON, falling back to `fallback()` when the file is absent or bad
    pub fn read_json_or<T, F>(&self, path: &Path, fallback: F) -> (T, LoadSource)
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return (fallback(), LoadSource::Missing);
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "unreadable state file, using defaults");
                return (fallback(), LoadSource::Malformed);
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => (value, LoadSource::File),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "malformed state file, using defaults");
                (fallback(), LoadSource::Malformed)
            }
        }
    }

    // =========================================================================
    // Typed state
    // =========================================================================

    pub fn load_colors(&self) -> (CategoryColors, LoadSource) {
        self.read_json_or(&self.colors_file(), CategoryColors::default)
    }

    pub fn save_colors(&self, colors: &CategoryColors) -> Result<()> {
        self.write_json(&self.colors_file(), colors)
    }

    /// `seed_sample` only applies when no progress file exists yet
    pub fn load_progress(&self, seed_sample: bool) -> (ProgressStore, LoadSource) {
        match self.read_json_or(&self.progress_file(), ProgressStore::new) {
            (_, LoadSource::Missing) if seed_sample => (ProgressStore::sample(), LoadSource::Missing),
            loaded => loaded,
        }
    }

    pub fn save_progress(&self, progress: &ProgressStore) -> Result<()> {
        self.write_json(&self.progress_file(), progress)
    }

    pub fn load_overrides(&self) -> (OverrideStore, LoadSource) {
        self.read_json_or(&self.overrides_file(), OverrideStore::default)
    }

    pub fn save_overrides(&self, overrides: &OverrideStore) -> Result<()> {
        self.write_json(&self.overrides_file(), overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_files_yield_defaults() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());

        let (colors, source) = storage.load_colors();
        assert_eq!(source, LoadSource::Missing);
        assert_eq!(colors, CategoryColors::default());

        let (progress, _) = storage.load_progress(false);
        assert!(progress.is_empty());

        let (progress, _) = storage.load_progress(true);
        assert_eq!(progress, ProgressStore::sample());
    }

    #[test]
    fn malformed_progress_falls_back_entirely() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        fs::write(storage.progress_file(), r#"{"brand-audit": {"inventory": tr"#).unwrap();

        let (progress, source) = storage.load_progress(false);
        assert_eq!(source, LoadSource::Malformed);
        assert!(progress.is_empty());

        let (progress, _) = storage.load_progress(true);
        assert!(progress.is_empty());
    }

    #[test]
    fn wrongly_shaped_colors_fall_back() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        fs::write(storage.colors_file(), r##"["#ffffff"]"##).unwrap();

        let (colors, source) = storage.load_colors();
        assert_eq!(source, LoadSource::Malformed);
        assert_eq!(colors, CategoryColors::default());
    }

    #[test]
    fn overrides_round_trip_through_disk() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("state"));

        let mut store = OverrideStore::default();
        store.delete("naming-review");
        storage.save_overrides(&store).unwrap();

        let (loaded, source) = storage.load_overrides();
        assert_eq!(source, LoadSource::File);
        assert!(loaded.is_deleted("naming-review"));
    }
}
