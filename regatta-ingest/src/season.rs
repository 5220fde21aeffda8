//! Season aggregation
//!
//! Reads `season_<n>.json` for each configured season number, normalizes every
//! event, and files it under its slug key. A missing feed is not an error (the
//! league simply has no such season yet); an unreadable one is skipped with a
//! warning.

use crate::event::normalize_event;
use crate::raw::Node;
use regatta_common::model::{KeyConflict, SeasonRecord, UNKNOWN_TEAM_CODE};
use regatta_common::{CanonicalDocument, Error, Result};
use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of normalizing one season feed
#[derive(Debug, Clone)]
pub struct SeasonOutcome {
    pub record: SeasonRecord,
    /// Events turned away because their key was already taken
    pub event_conflicts: Vec<KeyConflict>,
    /// Team registrations turned away, across all events
    pub team_conflicts: Vec<KeyConflict>,
}

/// Normalize every event of one season feed (a JSON array of raw events).
pub fn normalize_season(season_number: u32, feed: &Value) -> SeasonOutcome {
    let mut record = SeasonRecord::new(season_number);
    let mut event_conflicts = Vec::new();
    let mut team_conflicts = Vec::new();

    for (index, entry) in Node::new(feed).items().enumerate() {
        let event = normalize_event(entry, index);
        debug!(
            season = season_number,
            key = %event.key,
            teams = event.record.num_teams,
            days = event.record.num_days,
            "Normalized event"
        );
        team_conflicts.extend(event.team_conflicts);

        if let Err(conflict) = record.insert_event(event.key, event.record) {
            warn!(season = season_number, %conflict, "Event key conflict, later event rejected");
            event_conflicts.push(conflict);
        }
    }

    SeasonOutcome {
        record,
        event_conflicts,
        team_conflicts,
    }
}

/// Per-season counts printed after ingest
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonSummary {
    pub season_key: String,
    pub events: usize,
    pub teams: usize,
    pub crew: usize,
    pub event_conflicts: Vec<KeyConflict>,
    pub team_conflicts: Vec<KeyConflict>,
}

/// Operator-facing summary of one ingest run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestSummary {
    pub seasons: Vec<SeasonSummary>,
}

impl IngestSummary {
    pub fn event_conflict_count(&self) -> usize {
        self.seasons.iter().map(|s| s.event_conflicts.len()).sum()
    }

    /// Render the summary printed after the document is written to `output`
    pub fn render(&self, output: &Path) -> String {
        let mut text = format!(
            "Created {} with {} seasons\n",
            output.display(),
            self.seasons.len()
        );
        for season in &self.seasons {
            let _ = writeln!(
                text,
                "{}: {} events, {} teams, {} crew members",
                season.season_key, season.events, season.teams, season.crew
            );
        }

        let conflicts: Vec<String> = self
            .seasons
            .iter()
            .flat_map(|season| {
                let events = season
                    .event_conflicts
                    .iter()
                    .map(move |c| format!("  {} event {}", season.season_key, c));
                let teams = season
                    .team_conflicts
                    .iter()
                    .filter(|c| c.key == UNKNOWN_TEAM_CODE)
                    .map(move |c| format!("  {} team {}", season.season_key, c));
                events.chain(teams)
            })
            .collect();
        if !conflicts.is_empty() {
            let _ = writeln!(text, "Conflicts ({}):", conflicts.len());
            for line in conflicts {
                text.push_str(&line);
                text.push('\n');
            }
        }
        text
    }
}

/// Drives normalization across the closed set of season feeds
#[derive(Debug, Clone)]
pub struct SeasonAggregator {
    feed_dir: PathBuf,
    seasons: Vec<u32>,
    strict: bool,
}

impl SeasonAggregator {
    pub fn new(feed_dir: impl Into<PathBuf>, seasons: Vec<u32>) -> Self {
        Self {
            feed_dir: feed_dir.into(),
            seasons,
            strict: false,
        }
    }

    /// Abort on the first event-key conflict instead of warning
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// `<feed_dir>/season_<n>.json`
    pub fn feed_path(&self, season_number: u32) -> PathBuf {
        self.feed_dir.join(format!("season_{}.json", season_number))
    }

    /// Read a season feed; `Ok(None)` when the file does not exist
    fn read_feed(&self, season_number: u32) -> Result<Option<Value>> {
        let path = self.feed_path(season_number);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let feed: Value = serde_json::from_str(&content)?;
        if !feed.is_array() {
            return Err(Error::InvalidInput(format!(
                "{} is not a JSON array of events",
                path.display()
            )));
        }
        Ok(Some(feed))
    }

    /// Normalize every available season.
    ///
    /// # Errors
    /// `Conflict` in strict mode when two events of a season share a key.
    pub fn run(&self) -> Result<(CanonicalDocument, IngestSummary)> {
        let mut document = CanonicalDocument::new();
        let mut summary = IngestSummary::default();

        for &season_number in &self.seasons {
            let feed = match self.read_feed(season_number) {
                Ok(Some(feed)) => feed,
                Ok(None) => {
                    debug!(season = season_number, path = %self.feed_path(season_number).display(), "No feed, skipping season");
                    continue;
                }
                Err(e) => {
                    warn!(season = season_number, error = %e, "Unreadable feed, skipping season");
                    continue;
                }
            };

            let outcome = normalize_season(season_number, &feed);
            if self.strict {
                if let Some(conflict) = outcome.event_conflicts.first() {
                    return Err(Error::Conflict(format!(
                        "season {}: event {}",
                        season_number, conflict
                    )));
                }
            }

            let season_key = CanonicalDocument::season_key(season_number);
            info!(
                season = %season_key,
                events = outcome.record.events.len(),
                "Season normalized"
            );
            summary.seasons.push(SeasonSummary {
                season_key: season_key.clone(),
                events: outcome.record.events.len(),
                teams: outcome.record.total_teams(),
                crew: outcome.record.total_crew(),
                event_conflicts: outcome.event_conflicts,
                team_conflicts: outcome.team_conflicts,
            });

            if let Err(conflict) = document.insert_season(outcome.record) {
                warn!(%conflict, "Season listed twice, keeping first");
                summary.seasons.pop();
            }
        }

        Ok((document, summary))
    }
}
