//! Capture plan
//!
//! Where each expected race's packets belong on disk and which time window a
//! capture run has to poll. Nothing is fetched here.

use regatta_common::model::DayRecord;
use regatta_common::time::{format_millis, parse_iso_millis};
use regatta_common::{race_folder_name, CanonicalDocument};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Capture location and window of one expected race
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCapture {
    pub season: String,
    pub event: String,
    /// 1-based day index within the event
    pub day_number: usize,
    pub race_name: String,
    pub race_folder: String,
    /// `YYYYMMDD` segment of the packet source
    pub date_path: Option<String>,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
}

impl PlannedCapture {
    /// `<season>/<event>/day_<n>/<race_folder>`
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(&self.season)
            .join(&self.event)
            .join(format!("day_{}", self.day_number))
            .join(&self.race_folder)
    }

    pub fn capture_dir(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.relative_dir())
    }
}

/// Day date-path, else the day date or race start compacted to `YYYYMMDD`
fn date_path_for(day: &DayRecord, race_start: Option<&str>) -> Option<String> {
    if let Some(path) = day.date_path.as_deref().filter(|p| !p.is_empty()) {
        return Some(path.to_string());
    }
    let source = day
        .date
        .as_deref()
        .filter(|d| !d.is_empty())
        .or(race_start)?;
    let compact: String = source.chars().take(10).filter(|c| *c != '-').collect();
    Some(compact).filter(|c| !c.is_empty())
}

/// One planned capture per named race, in document order
pub fn plan_captures(document: &CanonicalDocument) -> Vec<PlannedCapture> {
    let mut plan = Vec::new();
    for (season_key, season) in document.seasons() {
        for (event_key, event) in &season.events {
            for (index, day) in event.days.iter().enumerate() {
                for race in &day.races {
                    let Some(name) = race.name.as_deref().filter(|n| !n.is_empty()) else {
                        warn!(season = season_key, event = %event_key, "Unnamed race has no capture folder");
                        continue;
                    };
                    plan.push(PlannedCapture {
                        season: season_key.to_string(),
                        event: event_key.clone(),
                        day_number: index + 1,
                        race_name: name.to_string(),
                        race_folder: race_folder_name(name),
                        date_path: date_path_for(day, race.start_date_time.as_deref()),
                        start_ms: parse_iso_millis(race.start_date_time.as_deref()),
                        end_ms: parse_iso_millis(race.end_date_time.as_deref()),
                    });
                }
            }
        }
    }
    plan
}

/// One line per planned capture
pub fn render_plan(plan: &[PlannedCapture], data_dir: &Path) -> String {
    let mut output = String::new();
    for capture in plan {
        let window = match (capture.start_ms, capture.end_ms) {
            (Some(start), Some(end)) => format!(
                "{}..{} ({} .. {})",
                start,
                end,
                format_millis(start).unwrap_or_default(),
                format_millis(end).unwrap_or_default()
            ),
            (Some(start), None) => format!("{}..? ({})", start, format_millis(start).unwrap_or_default()),
            _ => "window unknown".to_string(),
        };
        output.push_str(&format!(
            "{}  date={}  {}\n",
            capture.capture_dir(data_dir).display(),
            capture.date_path.as_deref().unwrap_or("-"),
            window
        ));
    }
    output.push_str(&format!("{} races planned\n", plan.len()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use regatta_common::normalize_race_name;
    use serde_json::json;

    fn document() -> CanonicalDocument {
        serde_json::from_value(json!({
            "season4": {"season_number": 4, "events": {
                "sydney": {"days": [
                    {"date_path": "20240224", "races": [
                        {"name": "Race 1",
                         "start_date_time": "2024-02-24T03:00:00Z",
                         "end_date_time": "2024-02-24T03:20:00Z"}
                    ]},
                    {"date": "2024-02-25", "races": [
                        {"name": "Match Race Final", "start_date_time": "2024-02-25T05:00:00Z"},
                        {"name": null}
                    ]},
                    {"races": [{"name": "Race 9", "start_date_time": "2024-02-26T01:00:00Z"}]},
                    {"races": [{"name": "Race 10"}]}
                ]}
            }}
        }))
        .unwrap()
    }

    #[test]
    fn test_plan_paths_and_windows() {
        let plan = plan_captures(&document());
        assert_eq!(plan.len(), 4);

        assert_eq!(plan[0].relative_dir(), PathBuf::from("season4/sydney/day_1/race_1"));
        assert_eq!(plan[0].date_path.as_deref(), Some("20240224"));
        assert_eq!(plan[0].start_ms, Some(1_708_743_600_000));
        assert_eq!(plan[0].end_ms, Some(1_708_744_800_000));

        assert_eq!(plan[1].relative_dir(), PathBuf::from("season4/sydney/day_2/match_race_final"));
        assert_eq!(plan[1].date_path.as_deref(), Some("20240225"));
        assert_eq!(plan[1].end_ms, None);

        assert_eq!(plan[2].day_number, 3);
        assert_eq!(plan[2].date_path.as_deref(), Some("20240226"));
        assert_eq!(plan[3].date_path, None);
    }

    #[test]
    fn test_folder_names_join_back_to_race_names() {
        for capture in plan_captures(&document()) {
            assert_eq!(
                normalize_race_name(Some(capture.race_folder.as_str())),
                normalize_race_name(Some(capture.race_name.as_str()))
            );
        }
    }

    #[test]
    fn test_render_plan() {
        let text = render_plan(&plan_captures(&document()), Path::new("data"));
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("data/season4/sydney/day_1/race_1  date=20240224  1708743600000..1708744800000"));
        assert!(text.contains("window unknown"));
        assert!(text.ends_with("4 races planned\n"));
    }
}
