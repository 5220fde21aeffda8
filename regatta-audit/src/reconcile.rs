//! Race reconciliation
//!
//! Joins expected races (from the canonical document) with downloaded race
//! folders on `(season, event, match key)`:
//!
//! - Per event, the set difference of match keys gives missing and extra races.
//! - Per downloaded folder, the matching expected race is looked up and the
//!   capture is validated: the opening packet must line up with the scheduled
//!   start, and the closing packet must report the terminal status.
//!
//! Per-race anomalies never abort the run; they become issue strings on a
//! [`RaceFinding`].

use crate::expected::ExpectedRace;
use crate::packet::{list_capture_files, PacketStatus};
use crate::scanner::DownloadedRace;
use indexmap::{IndexMap, IndexSet};
use regatta_common::config::AuditConfig;
use regatta_common::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Issue recorded for a downloaded race with no canonical counterpart
pub const NO_MATCH_ISSUE: &str = "No matching race in canonical data";

/// Classification of one downloaded race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Ok,
    Incomplete,
    Error,
}

/// Validation result for one downloaded race folder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceFinding {
    pub season: String,
    pub event: String,
    /// Race folder name as found on disk
    pub race: String,
    pub verdict: Verdict,
    pub issues: Vec<String>,
    /// Status reported by the closing packet (opening packet when only one exists)
    pub boat_status: Option<String>,
    /// Opening packet timestamp
    pub timestamp: Option<i64>,
    /// Scheduled start of the matched race
    pub expected_timestamp: Option<i64>,
}

impl RaceFinding {
    fn new(race: &DownloadedRace, verdict: Verdict) -> Self {
        Self {
            season: race.season.clone(),
            event: race.event.clone(),
            race: race.race_folder.clone(),
            verdict,
            issues: Vec::new(),
            boat_status: None,
            timestamp: None,
            expected_timestamp: None,
        }
    }

    /// `season/event/race`
    pub fn label(&self) -> String {
        format!("{}/{}/{}", self.season, self.event, self.race)
    }
}

/// Event whose downloaded races differ from the expected ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncompleteEvent {
    /// `season/event`
    pub event: String,
    /// Expected race names with no folder
    pub missing: Vec<String>,
    /// Folder names with no expected race
    pub extra: Vec<String>,
}

/// Aggregate reconciliation result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditReport {
    pub expected_races: usize,
    pub downloaded_races: usize,
    pub expected_events: usize,
    pub downloaded_events: usize,
    pub ok_events: Vec<String>,
    pub incomplete_events: Vec<IncompleteEvent>,
    pub ok_races: Vec<RaceFinding>,
    pub incomplete_races: Vec<RaceFinding>,
    pub error_races: Vec<RaceFinding>,
}

fn percent(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

impl AuditReport {
    /// Downloaded distinct events over expected distinct events
    pub fn event_completion_pct(&self) -> f64 {
        percent(self.downloaded_events, self.expected_events)
    }

    /// Downloaded race folders over expected races
    pub fn race_folder_pct(&self) -> f64 {
        percent(self.downloaded_races, self.expected_races)
    }

    /// Races that matched and validated
    pub fn validated_races(&self) -> usize {
        self.ok_races.len() + self.incomplete_races.len()
    }

    /// OK races over matched races
    pub fn valid_race_pct(&self) -> f64 {
        percent(self.ok_races.len(), self.validated_races())
    }

    /// Write the report and its percentages as pretty JSON
    pub fn export_json(&self, path: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct Export<'a> {
            event_completion_pct: f64,
            race_folder_pct: f64,
            valid_race_pct: f64,
            #[serde(flatten)]
            report: &'a AuditReport,
        }

        let export = Export {
            event_completion_pct: self.event_completion_pct(),
            race_folder_pct: self.race_folder_pct(),
            valid_race_pct: self.valid_race_pct(),
            report: self,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&export)?)?;
        Ok(())
    }
}

/// Compare expected and downloaded races of every expected event.
///
/// Events are visited in first-appearance order of the expected list. Returns
/// the labels of complete events and the incomplete ones with their missing
/// (expected order) and extra (download order) race names.
pub fn compare_events(
    expected: &[ExpectedRace],
    downloaded: &[DownloadedRace],
) -> (Vec<String>, Vec<IncompleteEvent>) {
    let mut expected_by_event: IndexMap<(&str, &str), Vec<&ExpectedRace>> = IndexMap::new();
    for race in expected {
        expected_by_event.entry(race.event_id()).or_default().push(race);
    }
    let mut downloaded_by_event: HashMap<(&str, &str), Vec<&DownloadedRace>> = HashMap::new();
    for race in downloaded {
        downloaded_by_event.entry(race.event_id()).or_default().push(race);
    }

    let mut ok_events = Vec::new();
    let mut incomplete_events = Vec::new();

    for ((season, event), expected_races) in &expected_by_event {
        let downloaded_races = downloaded_by_event
            .get(&(*season, *event))
            .map(Vec::as_slice)
            .unwrap_or_default();

        let expected_keys: IndexSet<&str> =
            expected_races.iter().map(|r| r.match_key.as_str()).collect();
        let downloaded_keys: IndexSet<&str> =
            downloaded_races.iter().map(|r| r.match_key.as_str()).collect();

        let mut missing = Vec::new();
        let mut reported = IndexSet::new();
        for race in expected_races {
            let key = race.match_key.as_str();
            if !downloaded_keys.contains(key) && reported.insert(key) {
                missing.push(race.display_name().to_string());
            }
        }

        let mut extra = Vec::new();
        let mut reported = IndexSet::new();
        for race in downloaded_races {
            let key = race.match_key.as_str();
            if !expected_keys.contains(key) && reported.insert(key) {
                extra.push(race.race_folder.clone());
            }
        }

        let label = format!("{}/{}", season, event);
        if missing.is_empty() && extra.is_empty() {
            ok_events.push(label);
        } else {
            debug!(event = %label, missing = missing.len(), extra = extra.len(), "Incomplete event");
            incomplete_events.push(IncompleteEvent {
                event: label,
                missing,
                extra,
            });
        }
    }

    (ok_events, incomplete_events)
}

/// Race reconciler
#[derive(Debug, Clone)]
pub struct Reconciler {
    tolerance_ms: i64,
    terminal_status: String,
    capture_extension: String,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::from_config(&AuditConfig::default())
    }
}

impl Reconciler {
    pub fn new(
        tolerance_ms: i64,
        terminal_status: impl Into<String>,
        capture_extension: impl Into<String>,
    ) -> Self {
        Self {
            tolerance_ms,
            terminal_status: terminal_status.into(),
            capture_extension: capture_extension.into(),
        }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self::new(
            config.timestamp_tolerance_ms,
            config.terminal_status.clone(),
            config.capture_extension.clone(),
        )
    }

    /// Reconcile the whole capture tree against the expected index
    pub fn reconcile(&self, expected: &[ExpectedRace], downloaded: &[DownloadedRace]) -> AuditReport {
        let expected_events: IndexSet<(&str, &str)> =
            expected.iter().map(ExpectedRace::event_id).collect();
        let downloaded_events: IndexSet<(&str, &str)> =
            downloaded.iter().map(DownloadedRace::event_id).collect();

        let (ok_events, incomplete_events) = compare_events(expected, downloaded);

        // First expected race wins for a repeated (season, event, key)
        let mut lookup: HashMap<(&str, &str, &str), &ExpectedRace> = HashMap::new();
        for race in expected {
            lookup
                .entry((race.season.as_str(), race.event.as_str(), race.match_key.as_str()))
                .or_insert(race);
        }

        let mut report = AuditReport {
            expected_races: expected.len(),
            downloaded_races: downloaded.len(),
            expected_events: expected_events.len(),
            downloaded_events: downloaded_events.len(),
            ok_events,
            incomplete_events,
            ..Default::default()
        };

        for race in downloaded {
            let matched = lookup
                .get(&(race.season.as_str(), race.event.as_str(), race.match_key.as_str()))
                .copied();
            let finding = self.validate_race(race, matched);
            debug!(race = %finding.label(), verdict = ?finding.verdict, "Race validated");
            match finding.verdict {
                Verdict::Ok => report.ok_races.push(finding),
                Verdict::Incomplete => report.incomplete_races.push(finding),
                Verdict::Error => report.error_races.push(finding),
            }
        }

        info!(
            ok = report.ok_races.len(),
            incomplete = report.incomplete_races.len(),
            errors = report.error_races.len(),
            "Reconciliation complete"
        );
        report
    }

    /// Validate one downloaded race against its matched expected race.
    pub fn validate_race(&self, race: &DownloadedRace, matched: Option<&ExpectedRace>) -> RaceFinding {
        let Some(expected) = matched else {
            let mut finding = RaceFinding::new(race, Verdict::Error);
            finding.issues.push(NO_MATCH_ISSUE.to_string());
            return finding;
        };

        let mut finding = RaceFinding::new(race, Verdict::Incomplete);
        finding.expected_timestamp = expected.start_ms;

        let packets = match list_capture_files(&race.path, &self.capture_extension) {
            Ok(packets) => packets,
            Err(e) => {
                finding.issues.push(format!("Capture folder unreadable: {}", e));
                return finding;
            }
        };

        let (first, last) = match packets.as_slice() {
            [] => {
                finding.issues.push("No data files found".to_string());
                return finding;
            }
            [only] => {
                finding.timestamp = only.timestamp;
                finding.boat_status = Some(only.status().to_string());
                finding.issues.push("No last file found".to_string());
                return finding;
            }
            [first, .., last] => (first, last),
        };

        finding.timestamp = first.timestamp;
        let closing = last.status();
        finding.boat_status = Some(closing.to_string());

        finding
            .issues
            .extend(self.check_timestamp(expected.start_ms, first.timestamp));
        finding.issues.extend(self.check_terminal(&closing));

        if finding.issues.is_empty() {
            finding.verdict = Verdict::Ok;
        }
        finding
    }

    /// Opening packet must fall within the tolerance of the scheduled start.
    ///
    /// A missing input is not a failure.
    pub fn check_timestamp(&self, expected_ms: Option<i64>, first_ms: Option<i64>) -> Option<String> {
        let (expected, actual) = (expected_ms?, first_ms?);
        if expected.abs_diff(actual) > self.tolerance_ms.unsigned_abs() {
            Some(format!(
                "First file timestamp mismatch: expected {}, got {}",
                expected, actual
            ))
        } else {
            None
        }
    }

    /// Closing packet must report the terminal status
    pub fn check_terminal(&self, status: &PacketStatus) -> Option<String> {
        if status.is(&self.terminal_status) {
            None
        } else {
            Some(format!(
                "Last file first boatStatus is '{}' (expected '{}')",
                status, self.terminal_status
            ))
        }
    }
}
