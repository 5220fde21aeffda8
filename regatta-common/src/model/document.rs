//! Canonical document persistence

use super::{KeyConflict, SeasonRecord};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Season-key → season mapping, ordered by season number
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalDocument(IndexMap<String, SeasonRecord>);

impl CanonicalDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document key for a season number (`4` → `season4`)
    pub fn season_key(season_number: u32) -> String {
        format!("season{}", season_number)
    }

    /// Add a season, keeping seasons ordered by number.
    pub fn insert_season(
        &mut self,
        season: SeasonRecord,
    ) -> std::result::Result<(), KeyConflict> {
        let key = Self::season_key(season.season_number);
        if self.0.contains_key(&key) {
            return Err(KeyConflict {
                kept: key.clone(),
                rejected: key.clone(),
                key,
            });
        }
        self.0.insert(key, season);
        self.0
            .sort_by(|_, a, _, b| a.season_number.cmp(&b.season_number));
        Ok(())
    }

    pub fn get(&self, season_key: &str) -> Option<&SeasonRecord> {
        self.0.get(season_key)
    }

    pub fn seasons(&self) -> impl Iterator<Item = (&str, &SeasonRecord)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total races across all seasons, events and days
    pub fn race_count(&self) -> usize {
        self.0
            .values()
            .flat_map(|s| s.events.values())
            .map(|e| e.races().count())
            .sum()
    }

    /// Load a persisted document.
    ///
    /// # Errors
    /// `NotFound` when the file does not exist, `Json` when it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "canonical document {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        let document: Self = serde_json::from_str(&content)?;
        debug!(
            path = %path.display(),
            seasons = document.len(),
            "Loaded canonical document"
        );
        Ok(document)
    }

    /// Write the document as pretty JSON.
    ///
    /// Written to a sibling temp file first, then renamed over `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        let temp_path = temp_path_for(path);
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, path)?;

        debug!(path = %path.display(), "Wrote canonical document");
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
