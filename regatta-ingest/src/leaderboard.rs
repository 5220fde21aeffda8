//! Leaderboard extraction and cleaning
//!
//! The feed carries placeholder leaderboards for races that have not run: one
//! item per team with every scored field null. Extraction keeps absent fields as
//! `None` so [`clean_leaderboard`] can recognise such a board and drop it instead
//! of reporting phantom zero-point rows. A present value that does not fit its
//! typed field (`"position": "DNF"`) is kept verbatim in the entry's `unparsed`
//! map, so it still counts as data.

use crate::raw::Node;
use indexmap::IndexMap;
use regatta_common::model::LeaderboardEntry;
use serde_json::Value;
use tracing::debug;

/// Flatten a leaderboard payload (`{"items": [...]}`) into entries.
///
/// An absent payload, or one without an `items` array, yields an empty list.
pub fn extract_leaderboard(payload: Node<'_>) -> Vec<LeaderboardEntry> {
    payload.get("items").items().map(extract_entry).collect()
}

/// Source values of one item that did not convert
#[derive(Default)]
struct Unparsed(IndexMap<String, Value>);

impl Unparsed {
    /// Convert `node`; a present value that does not convert is recorded
    /// under `field`.
    fn take<'a, T, F>(&mut self, field: &str, node: Node<'a>, convert: F) -> Option<T>
    where
        F: FnOnce(Node<'a>) -> Option<T>,
    {
        let value = convert(node);
        if value.is_none() {
            if let Some(raw) = node.cloned() {
                debug!(field, value = %raw, "Leaderboard value kept unparsed");
                self.0.insert(field.to_string(), raw);
            }
        }
        value
    }
}

/// Map one leaderboard item
pub fn extract_entry(item: Node<'_>) -> LeaderboardEntry {
    let team = item.get("team");
    let fleet = item.get("fleetData");
    let driver = item.get("helmsmanOverride").or(item.get("helmFullName"));
    let mut unparsed = Unparsed::default();

    LeaderboardEntry {
        position: unparsed.take("pos", item.get("position"), Node::i64),
        previous_position: unparsed.take("prev_pos", item.get("previousPosition"), Node::i64),
        team_code: unparsed.take("team_code", team.get("code"), Node::string),
        team_name: unparsed.take("team_name", team.get("name"), Node::string),
        points: unparsed.take("pts", item.get("points"), Node::f64),
        driver: unparsed.take("driver", driver, Node::string),
        country: unparsed.take("country", fleet.get("country"), Node::string),
        regatta_points: unparsed.take("regatta_points", fleet.get("regatta_points"), Node::f64),
        regatta_rank: unparsed.take("regatta_rank", fleet.get("regatta_rank"), Node::i64),
        season_points: unparsed.take("season_points", fleet.get("season_points"), Node::f64),
        season_rank: unparsed.take("season_rank", fleet.get("season_rank"), Node::i64),
        split: unparsed.take("split", fleet.get("split"), Node::string),
        unparsed: unparsed.0,
    }
}

/// Collapse a leaderboard whose every entry is blank to an empty list.
///
/// A board with at least one populated field is returned unchanged.
pub fn clean_leaderboard(entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    if entries.iter().all(LeaderboardEntry::is_blank) {
        Vec::new()
    } else {
        entries
    }
}

/// Extract then clean
pub fn normalize_leaderboard(payload: Node<'_>) -> Vec<LeaderboardEntry> {
    clean_leaderboard(extract_leaderboard(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_payload_is_empty() {
        assert!(extract_leaderboard(Node::absent()).is_empty());

        let no_items = json!({"heading": "Race 1"});
        assert!(extract_leaderboard(Node::new(&no_items)).is_empty());
    }

    #[test]
    fn test_extract_entry_fields() {
        let payload = json!({"items": [{
            "position": 1,
            "previousPosition": "3",
            "points": 10,
            "helmFullName": "Tom Slingsby",
            "team": {"code": "AUS", "name": "Australia"},
            "fleetData": {
                "country": "Australia",
                "regatta_points": 42.5,
                "regatta_rank": 1,
                "season_points": "80",
                "season_rank": 2,
                "split": "A"
            }
        }]});

        let entries = extract_leaderboard(Node::new(&payload));
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.position, Some(1));
        assert_eq!(entry.previous_position, Some(3));
        assert_eq!(entry.team_code.as_deref(), Some("AUS"));
        assert_eq!(entry.team_name.as_deref(), Some("Australia"));
        assert_eq!(entry.points, Some(10.0));
        assert_eq!(entry.driver.as_deref(), Some("Tom Slingsby"));
        assert_eq!(entry.regatta_points, Some(42.5));
        assert_eq!(entry.season_points, Some(80.0));
        assert_eq!(entry.split.as_deref(), Some("A"));
    }

    #[test]
    fn test_driver_prefers_override() {
        let payload = json!({"items": [
            {"helmsmanOverride": "Stand-in", "helmFullName": "Regular"},
            {"helmsmanOverride": "", "helmFullName": "Regular"},
            {"helmFullName": "Regular"}
        ]});

        let drivers: Vec<Option<String>> = extract_leaderboard(Node::new(&payload))
            .into_iter()
            .map(|e| e.driver)
            .collect();
        assert_eq!(
            drivers,
            vec![
                Some("Stand-in".to_string()),
                Some("Regular".to_string()),
                Some("Regular".to_string())
            ]
        );
    }

    #[test]
    fn test_all_null_leaderboard_collapses() {
        let payload = json!({"items": [
            {"position": null, "points": null, "team": null},
            {},
            {"fleetData": {}}
        ]});

        assert_eq!(extract_leaderboard(Node::new(&payload)).len(), 3);
        assert!(normalize_leaderboard(Node::new(&payload)).is_empty());
    }

    #[test]
    fn test_partially_populated_leaderboard_preserved() {
        let payload = json!({"items": [
            {},
            {"points": 0},
            {"team": {"code": "NZL"}}
        ]});

        let extracted = extract_leaderboard(Node::new(&payload));
        let cleaned = normalize_leaderboard(Node::new(&payload));
        assert_eq!(cleaned, extracted);
        assert_eq!(cleaned[1].points, Some(0.0));
        assert_eq!(cleaned[2].team_code.as_deref(), Some("NZL"));
    }

    #[test]
    fn test_unparseable_values_keep_the_board() {
        let payload = json!({"items": [{"position": "DNF"}, {"position": "DNF"}]});

        let cleaned = normalize_leaderboard(Node::new(&payload));
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].position, None);
        assert_eq!(cleaned[0].unparsed.get("pos"), Some(&json!("DNF")));

        let written = serde_json::to_value(&cleaned[1]).unwrap();
        assert!(written["pos"].is_null());
        assert_eq!(written["unparsed"], json!({"pos": "DNF"}));
    }

    #[test]
    fn test_wrong_shaped_values_recorded_by_field() {
        let payload = json!({"items": [{
            "position": 2,
            "points": "n/a",
            "team": {"code": {"iso": "FRA"}},
            "fleetData": {"season_rank": [1]}
        }]});

        let entry = &extract_leaderboard(Node::new(&payload))[0];
        assert_eq!(entry.position, Some(2));
        assert_eq!(
            entry.unparsed.keys().collect::<Vec<_>>(),
            vec!["team_code", "pts", "season_rank"]
        );
    }

    #[test]
    fn test_clean_entries_carry_no_unparsed_field() {
        let payload = json!({"items": [{"position": 1, "points": 10}]});
        let written = serde_json::to_value(&extract_leaderboard(Node::new(&payload))[0]).unwrap();
        assert!(written.get("unparsed").is_none());
    }
}
