//! Team and athlete extraction
//!
//! Builds an event's team registry from the teams referenced by its results
//! leaderboard. Codes are registered in leaderboard order; the first team seen
//! for a code wins and later ones are turned away with a [`KeyConflict`].

use crate::raw::Node;
use regatta_common::model::{
    CrewMember, CrewSocials, KeyConflict, SimData, TeamColors, TeamRecord, TeamRegistry,
    TeamSocials, TeamUrls, UNKNOWN_TEAM_CODE,
};
use tracing::{debug, warn};

/// Registry key for a team node; missing codes collapse onto the `UNK` sentinel
pub fn team_code(team: Node<'_>) -> String {
    team.get("code")
        .text()
        .unwrap_or_else(|| UNKNOWN_TEAM_CODE.to_string())
}

/// Label used in conflict messages without extracting the whole team
fn team_label(team: Node<'_>, code: &str) -> String {
    match team.get("name").or(team.get("fullName")).text() {
        Some(name) => format!("{} ({})", name, code),
        None => code.to_string(),
    }
}

/// Name of the athlete flagged as helm in a raw team's roster
pub fn helm_from_roster(team: Node<'_>) -> Option<String> {
    team.get("athletes")
        .items()
        .find(|athlete| athlete.get("isHelm").is_truthy())
        .and_then(|athlete| athlete.get("name").string())
}

/// Map one raw team node
pub fn extract_team(team: Node<'_>) -> TeamRecord {
    TeamRecord {
        contentful_id: team.get("contentfulId").string(),
        code: team_code(team),
        name: team.get("name").string(),
        full_name: team.get("fullName").string(),
        is_active: team.get("isActive").bool(),
        boat_id: team.get("dataBoatId").scalar(),
        order: team.get("order").i64(),
        sim_data: SimData {
            color: team.get("simColour").string(),
            flag_url: team.get("simFlag").asset_url(),
        },
        colors: TeamColors {
            hex: team.get("hexColor").string(),
            primary: team.get("primaryTeamHexColour").string(),
            secondary: team.get("secondaryTeamHexColour").string(),
            tertiary: team.get("tertiaryTeamHexColour").string(),
            text: team.get("textColor").string(),
        },
        urls: TeamUrls {
            team: team.get("url").string(),
            logo: team.get("logo").asset_url(),
            wordmark: team.get("wordmark").asset_url(),
            team_photo: team.get("teamPhoto").asset_url(),
            flag: team.get("leaderboardFlag").asset_url(),
            app_flag: team.get("appCountryFlag").asset_url(),
        },
        socials: TeamSocials {
            facebook: team.get("facebookUrl").string(),
            instagram: team.get("instagramUrl").string(),
            twitter: team.get("twitterUrl").string(),
            youtube: team.get("youTubeUrl").string(),
            linkedin: team.get("linkedInUrl").string(),
        },
        crew: team
            .get("athletes")
            .items()
            .filter(|athlete| athlete.is_object())
            .map(extract_crew_member)
            .collect(),
    }
}

/// Map one raw athlete node
pub fn extract_crew_member(athlete: Node<'_>) -> CrewMember {
    let career = athlete.get("careerHistory");
    let biography = if career.is_object() {
        career.get("content").cloned()
    } else {
        career.cloned()
    };

    CrewMember {
        contentful_id: athlete.get("contentfulId").string(),
        athlete_id: athlete.get("athleteId").scalar(),
        name: athlete.get("name").string(),
        first_name: athlete.get("firstName").string(),
        last_name: athlete.get("lastName").string(),
        role: athlete.get("role").string(),
        is_helm: athlete.get("isHelm").bool(),
        dob: athlete.get("dateOfBirth").string(),
        hometown: athlete.get("hometown").string(),
        hometown_label: athlete.get("hometownLabel").string(),
        height: athlete.get("height").scalar(),
        weight: athlete.get("weight").scalar(),
        nationality: athlete.get("nationality").string(),
        profile_url: athlete
            .get("biographyPage")
            .get("components")
            .at(0)
            .get("url")
            .string(),
        biography,
        socials: CrewSocials {
            facebook: athlete.get("facebook").string(),
            instagram: athlete.get("instagram").string(),
            twitter: athlete.get("twitter").string(),
        },
        photo_url: athlete.get("photo").asset_url(),
        profile_photo_url: athlete.get("profilePhoto").asset_url(),
    }
}

/// Build the team registry for one event from its results leaderboard.
///
/// Returns the registry plus every rejected registration. A repeated real code
/// is ordinary (debug); a repeated `UNK` means distinct teams may be merging and
/// is logged at warn.
pub fn build_team_registry(leaderboard: Node<'_>) -> (TeamRegistry, Vec<KeyConflict>) {
    let mut registry = TeamRegistry::new();
    let mut conflicts = Vec::new();

    for team in leaderboard
        .get("items")
        .items()
        .map(|item| item.get("team"))
        .filter(|team| team.is_truthy())
    {
        let code = team_code(team);
        let label = team_label(team, &code);
        let is_sentinel = code == UNKNOWN_TEAM_CODE;

        // Memoized: a known code is rejected before its roster is extracted
        if let Err(conflict) = registry.insert_with(code, label, || extract_team(team)) {
            if is_sentinel {
                warn!(%conflict, "Team without code merged onto sentinel");
            } else {
                debug!(%conflict, "Repeated team code skipped");
            }
            conflicts.push(conflict);
        }
    }

    (registry, conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_team() -> serde_json::Value {
        json!({
            "contentfulId": "team-1",
            "code": "GBR",
            "name": "Great Britain",
            "fullName": "Emirates Great Britain SailGP Team",
            "isActive": true,
            "dataBoatId": 7,
            "order": 3,
            "simColour": "#012169",
            "simFlag": {"file": {"url": "//cdn/sim-gbr.png"}},
            "logo": {"file": {"url": "//cdn/logo-gbr.png"}},
            "wordmark": null,
            "teamPhoto": {"title": "no file here"},
            "twitterUrl": "https://x.com/gbr",
            "athletes": [
                {"name": "Giles Scott", "isHelm": true, "role": "Driver",
                 "careerHistory": {"content": [{"p": "Olympic gold"}]},
                 "biographyPage": {"components": [{"url": "/athletes/giles-scott"}]},
                 "photo": {"file": {"url": "//cdn/giles.jpg"}}},
                "not an athlete",
                {"name": "Iain Jensen", "careerHistory": "Plain text bio"}
            ]
        })
    }

    #[test]
    fn test_extract_team_fields() {
        let raw = sample_team();
        let team = extract_team(Node::new(&raw));

        assert_eq!(team.code, "GBR");
        assert_eq!(team.boat_id, Some(json!(7)));
        assert_eq!(team.order, Some(3));
        assert_eq!(team.is_active, Some(true));
        assert_eq!(team.sim_data.flag_url.as_deref(), Some("//cdn/sim-gbr.png"));
        assert_eq!(team.urls.logo.as_deref(), Some("//cdn/logo-gbr.png"));
        assert_eq!(team.urls.wordmark, None);
        assert_eq!(team.urls.team_photo, None);
        assert_eq!(team.socials.twitter.as_deref(), Some("https://x.com/gbr"));
        assert_eq!(team.crew.len(), 2);
        assert_eq!(team.helm_name(), Some("Giles Scott"));
    }

    #[test]
    fn test_extract_crew_biography_and_profile() {
        let raw = sample_team();
        let team = extract_team(Node::new(&raw));

        let helm = &team.crew[0];
        assert_eq!(helm.biography, Some(json!([{"p": "Olympic gold"}])));
        assert_eq!(helm.profile_url.as_deref(), Some("/athletes/giles-scott"));
        assert_eq!(helm.photo_url.as_deref(), Some("//cdn/giles.jpg"));
        assert_eq!(helm.profile_photo_url, None);

        let trimmer = &team.crew[1];
        assert_eq!(trimmer.biography, Some(json!("Plain text bio")));
        assert_eq!(trimmer.profile_url, None);
        assert_eq!(trimmer.is_helm, None);
    }

    #[test]
    fn test_helm_from_roster() {
        let raw = sample_team();
        assert_eq!(
            helm_from_roster(Node::new(&raw)).as_deref(),
            Some("Giles Scott")
        );

        let no_helm = json!({"athletes": [{"name": "Crew", "isHelm": false}]});
        assert_eq!(helm_from_roster(Node::new(&no_helm)), None);
    }

    #[test]
    fn test_registry_first_occurrence_wins() {
        let leaderboard = json!({"items": [
            {"team": {"code": "NZL", "name": "New Zealand", "athletes": [{"name": "A"}]}},
            {"team": {"code": "AUS", "name": "Australia"}},
            {"team": {"code": "NZL", "name": "Second NZL", "athletes": [{"name": "B"}, {"name": "C"}]}},
            {"position": 4}
        ]});

        let (registry, conflicts) = build_team_registry(Node::new(&leaderboard));

        assert_eq!(registry.codes().collect::<Vec<_>>(), vec!["NZL", "AUS"]);
        assert_eq!(registry.get("NZL").unwrap().name.as_deref(), Some("New Zealand"));
        assert_eq!(registry.crew_count(), 1);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].key, "NZL");
        assert_eq!(conflicts[0].rejected, "Second NZL (NZL)");
    }

    #[test]
    fn test_missing_codes_merge_onto_sentinel_and_are_flagged() {
        let leaderboard = json!({"items": [
            {"team": {"name": "Mystery One"}},
            {"team": {"name": "Mystery Two", "code": ""}}
        ]});

        let (registry, conflicts) = build_team_registry(Node::new(&leaderboard));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(UNKNOWN_TEAM_CODE));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].key, UNKNOWN_TEAM_CODE);
        assert_eq!(conflicts[0].kept, "Mystery One (UNK)");
    }
}
