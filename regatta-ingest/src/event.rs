//! Event normalization
//!
//! Composes the leaderboard and team extractors into one canonical
//! [`EventRecord`] per raw event, together with the slug key it is filed under.

use crate::leaderboard::normalize_leaderboard;
use crate::raw::Node;
use crate::teams::{build_team_registry, helm_from_roster};
use regatta_common::model::{
    DayRecord, EventDates, EventRecord, KeyConflict, LocationRecord, RaceRecord, SponsorRecord,
    WinnerRecord,
};
use regatta_common::slugify;
use serde_json::Value;

/// City used when an event names no location, short name or heading
pub const UNKNOWN_CITY: &str = "Unknown City";

/// One normalized event and the key it should be filed under
#[derive(Debug, Clone)]
pub struct NormalizedEvent {
    /// Slug of the resolved city/heading
    pub key: String,
    pub record: EventRecord,
    /// Team registrations turned away while building the registry
    pub team_conflicts: Vec<KeyConflict>,
}

/// Normalize one raw event; `index` is its 0-based position in the season feed.
pub fn normalize_event(entry: Node<'_>, index: usize) -> NormalizedEvent {
    let leaderboard = entry.get("appLeaderboard");
    let city = resolve_city(entry);
    let (teams, team_conflicts) = build_team_registry(leaderboard);

    let mut record = EventRecord {
        event_id: entry.get("contentfulId").string(),
        event_number: match entry.get("eventNumber").i64() {
            Some(number) => Some(number),
            None => i64::try_from(index + 1).ok(),
        },
        event_season: entry.get("eventSeason").scalar(),
        event_name: entry
            .get("name")
            .or(leaderboard.get("heading"))
            .string(),
        short_name: entry.get("shortName").string(),
        short_name_subtitle: entry.get("shortNameSubtitle").string(),
        event_label: entry.get("eventLabel").string(),
        broadcast_tab_name: entry.get("broadcastTabName").string(),
        city: city.clone(),
        country: entry.get("countryName").string(),
        country_code: entry.get("countryAbbreviation").string(),
        dates: EventDates {
            start: entry.get("startDateTime").string(),
            end: entry.get("endDateTime").string(),
        },
        location: extract_location(entry.get("location")),
        sponsor: extract_sponsor(leaderboard.get("appSponsor")),
        is_live_event: leaderboard.get("isLiveEvent").bool().unwrap_or(false),
        regatta_id: entry.get("regattaId").string(),
        website_url: entry.get("websiteUrl").string(),
        tickets_url: entry.get("ticketsUrl").string(),
        ticket_available_state: entry.get("ticketAvailableState").string(),
        introduction: entry.get("introduction").cloned(),
        winner: infer_winner(leaderboard),
        pre_race_summary: entry.get("preRaceSummary").cloned(),
        post_race_summary: entry.get("postRaceSummary").cloned(),
        leaderboard_info: entry.get("leaderboardInfo").cloned(),
        contentful_type: entry.get("contentfulType").string(),
        created: entry.get("created").string(),
        updated: entry.get("updated").string(),
        results_summary: normalize_leaderboard(leaderboard),
        days: extract_days(entry),
        teams,
        ..Default::default()
    };
    record.refresh_counts();

    NormalizedEvent {
        key: slugify(Some(city.as_str())),
        record,
        team_conflicts,
    }
}

/// City/heading: location name, else short name, else leaderboard nav heading.
pub fn resolve_city(entry: Node<'_>) -> String {
    entry
        .get("locationName")
        .or(entry.get("shortName"))
        .or(entry.get("appLeaderboard").get("appNavHeading"))
        .text()
        .unwrap_or_else(|| UNKNOWN_CITY.to_string())
}

/// Winner from the first leaderboard item, only when its position is exactly 1.
///
/// Helm: full name, then override, then fleet driver, then the roster's helm.
pub fn infer_winner(leaderboard: Node<'_>) -> Option<WinnerRecord> {
    let first = leaderboard.get("items").at(0);
    let ranked_first = first
        .get("position")
        .value()
        .and_then(Value::as_f64)
        .is_some_and(|position| position == 1.0);
    if !ranked_first {
        return None;
    }

    let team = first.get("team");
    let helm_name = first
        .get("helmFullName")
        .or(first.get("helmsmanOverride"))
        .or(first.get("fleetData").get("driver_full_name"))
        .text()
        .or_else(|| helm_from_roster(team));

    Some(WinnerRecord {
        team_code: team.get("code").string(),
        team_name: team.get("name").string(),
        helm_name,
    })
}

/// Sponsor block, present only when the sponsor has a name
pub fn extract_sponsor(sponsor: Node<'_>) -> Option<SponsorRecord> {
    let name = sponsor.get("name").text()?;
    Some(SponsorRecord {
        name,
        url: sponsor.get("url").string(),
        logo_url: sponsor.get("logo").asset_url(),
    })
}

pub fn extract_location(location: Node<'_>) -> LocationRecord {
    LocationRecord {
        lat: location.get("lat").f64(),
        lon: location.get("lon").f64(),
        location_name: location.get("locationName").string(),
    }
}

/// Race days with their races; every leaderboard is cleaned.
pub fn extract_days(entry: Node<'_>) -> Vec<DayRecord> {
    entry
        .get("raceDays")
        .items()
        .map(|day| DayRecord {
            contentful_id: day.get("contentfulId").string(),
            name: day.get("name").string(),
            day_label: day.get("dayLabel").string(),
            date: day.get("date").string(),
            date_path: day.get("date_path").string(),
            start_ts: day.get("start_ts").i64(),
            end_ts: day.get("end_ts").i64(),
            status: day.get("status").string(),
            start_date_time: day.get("startDateTime").string(),
            end_date_time: day.get("endDateTime").string(),
            race_summary: day.get("raceSummary").cloned(),
            leaderboard: normalize_leaderboard(day.get("appLeaderboard")),
            races: day.get("races").items().map(extract_race).collect(),
        })
        .collect()
}

fn extract_race(race: Node<'_>) -> RaceRecord {
    RaceRecord {
        contentful_id: race.get("contentfulId").string(),
        name: race.get("name").string(),
        start_date_time: race.get("startDateTime").string(),
        end_date_time: race.get("endDateTime").string(),
        leaderboard: normalize_leaderboard(race.get("appLeaderboard")),
    }
}
