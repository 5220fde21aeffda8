//! Canonical season/event/race/team document
//!
//! This is the schema-stable shape written to `races-data.json` by the ingest
//! tool and read back by the audit tool. Every optional source field is an
//! `Option` that serializes as `null`; scalar fields decode leniently so a
//! document written by an older tool still loads.

pub mod lenient;

mod document;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

pub use document::CanonicalDocument;

/// Team code used when a leaderboard team carries no code
pub const UNKNOWN_TEAM_CODE: &str = "UNK";

/// A second record claimed a key that is already taken.
///
/// The first record is kept; the rejected one is described so the source
/// problem can be traced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConflict {
    /// Contested key (event slug or team code)
    pub key: String,
    /// Label of the record that holds the key
    pub kept: String,
    /// Label of the record that was turned away
    pub rejected: String,
}

impl fmt::Display for KeyConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "key '{}' already held by '{}', rejected '{}'",
            self.key, self.kept, self.rejected
        )
    }
}

/// One season of events, keyed by event slug in feed order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub events: IndexMap<String, EventRecord>,
}

impl SeasonRecord {
    pub fn new(season_number: u32) -> Self {
        Self {
            season_number,
            events: IndexMap::new(),
        }
    }

    /// Insert an event under `key` unless the key is already taken.
    pub fn insert_event(&mut self, key: String, event: EventRecord) -> Result<(), KeyConflict> {
        if let Some(existing) = self.events.get(&key) {
            return Err(KeyConflict {
                kept: existing.label(),
                rejected: event.label(),
                key,
            });
        }
        self.events.insert(key, event);
        Ok(())
    }

    pub fn total_teams(&self) -> usize {
        self.events.values().map(|e| e.teams.len()).sum()
    }

    pub fn total_crew(&self) -> usize {
        self.events.values().map(|e| e.num_crew).sum()
    }
}

/// Geographic location of an event venue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub lon: Option<f64>,
    #[serde(default)]
    pub location_name: Option<String>,
}

/// Event start/end instants (ISO-8601 as published)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDates {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// Title sponsor; only present when the feed names one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SponsorRecord {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Event winner inferred from a rank-1 leaderboard entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinnerRecord {
    #[serde(default)]
    pub team_code: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub helm_name: Option<String>,
}

/// Normalized event document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub event_number: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_scalar")]
    pub event_season: Option<Value>,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub short_name_subtitle: Option<String>,
    #[serde(default)]
    pub event_label: Option<String>,
    #[serde(default)]
    pub broadcast_tab_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub dates: EventDates,
    #[serde(default)]
    pub location: LocationRecord,
    #[serde(default)]
    pub sponsor: Option<SponsorRecord>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_live_event: bool,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub regatta_id: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub tickets_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub ticket_available_state: Option<String>,
    #[serde(default)]
    pub introduction: Option<Value>,
    #[serde(default)]
    pub winner: Option<WinnerRecord>,
    #[serde(default)]
    pub pre_race_summary: Option<Value>,
    #[serde(default)]
    pub post_race_summary: Option<Value>,
    #[serde(default)]
    pub leaderboard_info: Option<Value>,
    #[serde(default)]
    pub contentful_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub created: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub updated: Option<String>,
    #[serde(default)]
    pub results_summary: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub days: Vec<DayRecord>,
    #[serde(default)]
    pub teams: TeamRegistry,
    #[serde(default)]
    pub num_teams: usize,
    #[serde(default)]
    pub num_crew: usize,
    #[serde(default)]
    pub num_days: usize,
}

impl EventRecord {
    /// Recompute the derived counts from the team registry and day list
    pub fn refresh_counts(&mut self) {
        self.num_teams = self.teams.len();
        self.num_crew = self.teams.crew_count();
        self.num_days = self.days.len();
    }

    /// Human-readable label for log and conflict messages
    pub fn label(&self) -> String {
        self.event_name
            .clone()
            .or_else(|| self.event_id.clone())
            .unwrap_or_else(|| self.city.clone())
    }

    /// Every race across every day, in document order
    pub fn races(&self) -> impl Iterator<Item = &RaceRecord> {
        self.days.iter().flat_map(|day| day.races.iter())
    }
}

/// One racing day of an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(default)]
    pub contentful_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub day_label: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub date_path: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub start_ts: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub end_ts: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_date_time: Option<String>,
    #[serde(default)]
    pub end_date_time: Option<String>,
    #[serde(default)]
    pub race_summary: Option<Value>,
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub races: Vec<RaceRecord>,
}

/// One race of a day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceRecord {
    #[serde(default)]
    pub contentful_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date_time: Option<String>,
    #[serde(default)]
    pub end_date_time: Option<String>,
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// One ranked participant row of a leaderboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "pos", default, deserialize_with = "lenient::opt_i64")]
    pub position: Option<i64>,
    #[serde(rename = "prev_pos", default, deserialize_with = "lenient::opt_i64")]
    pub previous_position: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub team_code: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(rename = "pts", default, deserialize_with = "lenient::opt_f64")]
    pub points: Option<f64>,
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub regatta_points: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub regatta_rank: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub season_points: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub season_rank: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub split: Option<String>,
    /// Source values that did not fit their typed field, keyed by field name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub unparsed: IndexMap<String, Value>,
}

impl LeaderboardEntry {
    /// True when no field carries a value, parsed or not
    pub fn is_blank(&self) -> bool {
        self == &Self::default()
    }
}

/// Team registry of one event, keyed by team code in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamRegistry(IndexMap<String, TeamRecord>);

impl TeamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `team` under its code unless the code is already taken.
    pub fn insert(&mut self, team: TeamRecord) -> Result<(), KeyConflict> {
        let code = team.code.clone();
        let label = team.label();
        self.insert_with(code, label, || team)
    }

    /// Register the team built by `build` under `code` unless the code is
    /// already taken. `build` only runs for a free code; `rejected` labels the
    /// team in the returned conflict.
    pub fn insert_with<F>(
        &mut self,
        code: String,
        rejected: String,
        build: F,
    ) -> Result<(), KeyConflict>
    where
        F: FnOnce() -> TeamRecord,
    {
        if let Some(existing) = self.0.get(&code) {
            return Err(KeyConflict {
                kept: existing.label(),
                key: code,
                rejected,
            });
        }
        self.0.insert(code, build());
        Ok(())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(code)
    }

    pub fn get(&self, code: &str) -> Option<&TeamRecord> {
        self.0.get(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total crew across all registered teams
    pub fn crew_count(&self) -> usize {
        self.0.values().map(|t| t.crew.len()).sum()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn teams(&self) -> impl Iterator<Item = &TeamRecord> {
        self.0.values()
    }
}

/// Simulator branding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimData {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub flag_url: Option<String>,
}

/// Team colour palette
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamColors {
    #[serde(default)]
    pub hex: Option<String>,
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub secondary: Option<String>,
    #[serde(default)]
    pub tertiary: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Team web and media URLs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamUrls {
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub wordmark: Option<String>,
    #[serde(default)]
    pub team_photo: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub app_flag: Option<String>,
}

/// Team social links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSocials {
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
}

/// Team entry of an event's registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    #[serde(default)]
    pub contentful_id: Option<String>,
    #[serde(default = "unknown_team_code", deserialize_with = "team_code")]
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_scalar")]
    pub boat_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub order: Option<i64>,
    #[serde(default)]
    pub sim_data: SimData,
    #[serde(default)]
    pub colors: TeamColors,
    #[serde(default)]
    pub urls: TeamUrls,
    #[serde(default)]
    pub socials: TeamSocials,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

fn unknown_team_code() -> String {
    UNKNOWN_TEAM_CODE.to_string()
}

/// Team code that tolerates `null` and empty values from older documents
fn team_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::opt_text(deserializer)?
        .filter(|code| !code.is_empty())
        .unwrap_or_else(unknown_team_code))
}

impl TeamRecord {
    pub fn label(&self) -> String {
        match (&self.name, &self.full_name) {
            (Some(name), _) | (None, Some(name)) => format!("{} ({})", name, self.code),
            (None, None) => self.code.clone(),
        }
    }

    /// Name of the crew member flagged as helm, if any
    pub fn helm_name(&self) -> Option<&str> {
        self.crew
            .iter()
            .find(|c| c.is_helm == Some(true))
            .and_then(|c| c.name.as_deref())
    }
}

/// Athlete social links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewSocials {
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
}

/// One athlete of a team roster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    #[serde(default)]
    pub contentful_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_scalar")]
    pub athlete_id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub is_helm: Option<bool>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub hometown: Option<String>,
    #[serde(default)]
    pub hometown_label: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_scalar")]
    pub height: Option<Value>,
    #[serde(default, deserialize_with = "lenient::opt_scalar")]
    pub weight: Option<Value>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub biography: Option<Value>,
    #[serde(default)]
    pub socials: CrewSocials,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
}
