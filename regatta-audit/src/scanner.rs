//! Downloaded-race scanner
//!
//! Walks `<root>/<season>/<event>/<day>/<race>/` and reports every race folder.
//! Only directories are descended; a file at any of the four levels is skipped.
//! Entries are visited in lexicographic name order so the output is stable
//! across platforms.

use regatta_common::normalize_race_name;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Depth of race folders below the capture root
const RACE_DEPTH: usize = 4;

/// Capture tree scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// A captured race folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadedRace {
    pub season: String,
    pub event: String,
    /// Folder name as found on disk
    pub race_folder: String,
    /// Join key shared with expected races
    pub match_key: String,
    pub path: PathBuf,
}

impl DownloadedRace {
    /// `(season, event)` pair the folder belongs to
    pub fn event_id(&self) -> (&str, &str) {
        (&self.season, &self.event)
    }
}

/// Capture tree scanner
pub struct CaptureScanner {
    root: PathBuf,
}

impl CaptureScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List every race folder under the root.
    ///
    /// # Errors
    /// The root is missing or not a directory. Unreadable entries below the
    /// root are logged and skipped.
    pub fn scan(&self) -> Result<Vec<DownloadedRace>, ScanError> {
        if !self.root.exists() {
            return Err(ScanError::PathNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }

        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .min_depth(1)
            .max_depth(RACE_DEPTH)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(is_directory);

        let mut races = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) if entry.depth() == RACE_DEPTH => {
                    if let Some(race) = self.race_from_entry(&entry) {
                        races.push(race);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Error accessing capture entry: {}", e);
                }
            }
        }

        tracing::debug!(
            root = %self.root.display(),
            races = races.len(),
            "Capture tree scanned"
        );
        Ok(races)
    }

    fn race_from_entry(&self, entry: &DirEntry) -> Option<DownloadedRace> {
        let relative = entry.path().strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let [season, event, _day, race_folder] = <[String; RACE_DEPTH]>::try_from(parts).ok()?;

        Some(DownloadedRace {
            match_key: normalize_race_name(Some(race_folder.as_str())),
            season,
            event,
            race_folder,
            path: entry.path().to_path_buf(),
        })
    }
}

fn is_directory(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
}
