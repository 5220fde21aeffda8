//! Expected-race index
//!
//! Flattens the canonical document into one entry per race, in document order.

use regatta_common::time::parse_iso_millis;
use regatta_common::{normalize_race_name, CanonicalDocument};
use serde::Serialize;

/// A race the canonical document says should have been captured
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedRace {
    /// Season key (`season4`)
    pub season: String,
    /// Event key (`sydney`)
    pub event: String,
    /// Race name as published
    pub race_name: Option<String>,
    /// Join key shared with downloaded race folders
    pub match_key: String,
    /// Scheduled start in epoch milliseconds; `None` when absent or unparsable
    pub start_ms: Option<i64>,
    pub source_id: Option<String>,
}

impl ExpectedRace {
    pub fn display_name(&self) -> &str {
        self.race_name.as_deref().unwrap_or("")
    }

    /// `(season, event)` pair the race belongs to
    pub fn event_id(&self) -> (&str, &str) {
        (&self.season, &self.event)
    }
}

/// Every race under every day under every event, in document order
pub fn build_expected_index(document: &CanonicalDocument) -> Vec<ExpectedRace> {
    document
        .seasons()
        .flat_map(|(season_key, season)| {
            season.events.iter().flat_map(move |(event_key, event)| {
                event.races().map(move |race| ExpectedRace {
                    season: season_key.to_string(),
                    event: event_key.clone(),
                    race_name: race.name.clone(),
                    match_key: normalize_race_name(race.name.as_deref()),
                    start_ms: parse_iso_millis(race.start_date_time.as_deref()),
                    source_id: race.contentful_id.clone(),
                })
            })
        })
        .collect()
}
