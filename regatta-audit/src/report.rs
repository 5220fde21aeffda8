//! Text report rendering
//!
//! Sections always appear in the same order: header, event completion, race
//! folder completion, incomplete events, detailed race validation, error races,
//! summary, incomplete races list. Empty optional sections are omitted.

use crate::reconcile::{AuditReport, RaceFinding};
use std::path::Path;

const RULE_WIDTH: usize = 80;

/// Formats an [`AuditReport`] for the terminal
pub struct ReportFormatter;

impl ReportFormatter {
    fn rule() -> String {
        "=".repeat(RULE_WIDTH)
    }

    fn banner(output: &mut String, title: &str) {
        output.push_str(&Self::rule());
        output.push('\n');
        output.push_str(title);
        output.push('\n');
        output.push_str(&Self::rule());
        output.push('\n');
    }

    /// Full report; `document` names the canonical document in the header
    pub fn format(report: &AuditReport, document: &Path) -> String {
        let mut output = String::new();

        Self::banner(&mut output, "REGATTA CAPTURE AUDIT - FEEDBACK REPORT");
        output.push_str(&format!(
            "\nTotal races expected from {}: {}\n",
            document.display(),
            report.expected_races
        ));
        output.push_str(&format!("Total race folders downloaded: {}\n", report.downloaded_races));

        output.push_str(&Self::format_event_completion(report));
        output.push_str(&Self::format_race_folder_completion(report));
        output.push_str(&Self::format_incomplete_events(report));

        output.push('\n');
        Self::banner(&mut output, "DETAILED RACE VALIDATION");
        output.push_str(&Self::format_race_validation(report));
        output.push_str(&Self::format_error_races(report));

        output.push('\n');
        Self::banner(&mut output, "SUMMARY");
        output.push_str(&Self::format_summary(report));

        output.push('\n');
        output.push_str(&Self::rule());
        output.push('\n');
        output
    }

    pub fn format_event_completion(report: &AuditReport) -> String {
        let mut output = String::new();
        output.push_str("\n--- EVENT COMPLETION ---\n");
        output.push_str(&format!("Expected events: {}\n", report.expected_events));
        output.push_str(&format!("Downloaded events: {}\n", report.downloaded_events));
        output.push_str(&format!("Event completion: {:.1}%\n", report.event_completion_pct()));
        output
    }

    pub fn format_race_folder_completion(report: &AuditReport) -> String {
        format!(
            "\n--- RACE FOLDER COMPLETION ---\nRace folders present: {:.1}% ({}/{})\n",
            report.race_folder_pct(),
            report.downloaded_races,
            report.expected_races
        )
    }

    pub fn format_incomplete_events(report: &AuditReport) -> String {
        let mut output = String::new();
        if report.incomplete_events.is_empty() {
            return output;
        }

        output.push_str("\nIncomplete events (missing or extra races):\n");
        for event in &report.incomplete_events {
            output.push_str(&format!("\n  {}:\n", event.event));
            if !event.missing.is_empty() {
                output.push_str(&format!("    Missing races: {}\n", event.missing.join(", ")));
            }
            if !event.extra.is_empty() {
                output.push_str(&format!("    Extra race folders: {}\n", event.extra.join(", ")));
            }
        }
        output
    }

    pub fn format_race_validation(report: &AuditReport) -> String {
        let mut output = String::new();
        output.push_str("\n--- RACE DATA VALIDATION ---\n");
        output.push_str(&format!("OK races: {}\n", report.ok_races.len()));
        output.push_str(&format!("Invalid races: {}\n", report.incomplete_races.len()));
        output.push_str(&format!(
            "Error races (no match in data): {}\n",
            report.error_races.len()
        ));

        if !report.incomplete_races.is_empty() {
            output.push_str("\n--- INVALID RACES ---\n");
            for race in &report.incomplete_races {
                output.push_str(&Self::format_invalid_race(race));
            }
        }
        output
    }

    /// One invalid race with its issues and observed values
    pub fn format_invalid_race(race: &RaceFinding) -> String {
        let mut output = format!("\n{}:\n", race.label());
        for issue in &race.issues {
            output.push_str(&format!("  - {}\n", issue));
        }
        output.push_str(&format!(
            "  Last file first boatStatus: {}\n",
            race.boat_status.as_deref().unwrap_or("Unknown")
        ));
        if let Some(expected) = race.expected_timestamp {
            output.push_str(&format!("  Expected timestamp: {}\n", expected));
        }
        if let Some(actual) = race.timestamp {
            output.push_str(&format!("  File timestamp: {}\n", actual));
        }
        output
    }

    pub fn format_error_races(report: &AuditReport) -> String {
        let mut output = String::new();
        if report.error_races.is_empty() {
            return output;
        }

        output.push_str("\n--- ERROR RACES (no matching data) ---\n");
        for race in &report.error_races {
            output.push_str(&format!("  {}: {}\n", race.label(), race.issues.join("; ")));
        }
        output
    }

    pub fn format_summary(report: &AuditReport) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Event completion: {:.1}% ({}/{})\n",
            report.event_completion_pct(),
            report.downloaded_events,
            report.expected_events
        ));
        output.push_str(&format!(
            "Race folder completion: {:.1}% ({}/{})\n",
            report.race_folder_pct(),
            report.downloaded_races,
            report.expected_races
        ));
        output.push_str(&format!(
            "Valid race data: {:.1}% ({}/{})\n",
            report.valid_race_pct(),
            report.ok_races.len(),
            report.validated_races()
        ));
        output.push_str(&format!(
            "Incomplete/Invalid races: {}\n",
            report.incomplete_races.len()
        ));

        if !report.incomplete_races.is_empty() {
            output.push_str("\nIncomplete races list:\n");
            for race in &report.incomplete_races {
                output.push_str(&format!("  - {}\n", race.label()));
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{IncompleteEvent, Verdict};

    fn finding(race: &str, verdict: Verdict, issues: &[&str]) -> RaceFinding {
        RaceFinding {
            season: "season4".to_string(),
            event: "sydney".to_string(),
            race: race.to_string(),
            verdict,
            issues: issues.iter().map(|s| s.to_string()).collect(),
            boat_status: Some("Racing".to_string()),
            timestamp: Some(1_700_000_002_500),
            expected_timestamp: Some(1_700_000_000_000),
        }
    }

    fn sample() -> AuditReport {
        AuditReport {
            expected_races: 4,
            downloaded_races: 3,
            expected_events: 1,
            downloaded_events: 1,
            ok_events: vec![],
            incomplete_events: vec![IncompleteEvent {
                event: "season4/sydney".to_string(),
                missing: vec!["Race 4".to_string()],
                extra: vec!["warmup".to_string()],
            }],
            ok_races: vec![finding("race_1", Verdict::Ok, &[])],
            incomplete_races: vec![finding(
                "race_2",
                Verdict::Incomplete,
                &["Last file first boatStatus is 'Racing' (expected 'Terminated')"],
            )],
            error_races: vec![finding("warmup", Verdict::Error, &["No matching race in canonical data"])],
        }
    }

    #[test]
    fn test_section_order() {
        let text = ReportFormatter::format(&sample(), Path::new("races-data.json"));
        let sections = [
            "REGATTA CAPTURE AUDIT - FEEDBACK REPORT",
            "--- EVENT COMPLETION ---",
            "--- RACE FOLDER COMPLETION ---",
            "Incomplete events (missing or extra races):",
            "DETAILED RACE VALIDATION",
            "--- RACE DATA VALIDATION ---",
            "--- INVALID RACES ---",
            "--- ERROR RACES (no matching data) ---",
            "SUMMARY",
            "Incomplete races list:",
        ];
        let positions: Vec<usize> = sections
            .iter()
            .map(|s| text.find(s).unwrap_or_else(|| panic!("missing section {}", s)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", positions);
    }

    #[test]
    fn test_figures() {
        let text = ReportFormatter::format(&sample(), Path::new("races-data.json"));
        assert!(text.contains("Total races expected from races-data.json: 4"));
        assert!(text.contains("Race folders present: 75.0% (3/4)"));
        assert!(text.contains("Missing races: Race 4"));
        assert!(text.contains("Extra race folders: warmup"));
        assert!(text.contains("Valid race data: 50.0% (1/2)"));
        assert!(text.contains("  Expected timestamp: 1700000000000"));
        assert!(text.contains("  - season4/sydney/race_2"));
        assert!(text.contains("  season4/sydney/warmup: No matching race in canonical data"));
    }

    #[test]
    fn test_optional_sections_omitted() {
        let report = AuditReport::default();
        let text = ReportFormatter::format(&report, Path::new("doc.json"));
        assert!(!text.contains("Incomplete events"));
        assert!(!text.contains("--- INVALID RACES ---"));
        assert!(!text.contains("--- ERROR RACES"));
        assert!(!text.contains("Incomplete races list:"));
        assert!(text.contains("Event completion: 0.0% (0/0)"));
    }
}
