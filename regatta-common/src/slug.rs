//! Stable identifiers derived from free-text names
//!
//! Two keys are produced here:
//! - **Slugs** (`slugify`) identify events inside a season. They are built from a
//!   city or heading and contain only `[a-z0-9_]`.
//! - **Match keys** (`normalize_race_name`) join expected races from the canonical
//!   document to race folders found on disk. Both sides of the join must go
//!   through this one function.

use regex::Regex;
use std::sync::OnceLock;

/// Key used when a name is absent or has no usable characters
pub const UNKNOWN_SLUG: &str = "unknown";

fn non_word_re() -> &'static Regex {
    static NON_WORD_RE: OnceLock<Regex> = OnceLock::new();
    NON_WORD_RE.get_or_init(|| Regex::new(r"[^a-z0-9_]+").expect("valid non-word regex"))
}

/// Lower-case `text` and collapse every run of non-word characters into one `_`.
///
/// Leading and trailing underscores are trimmed. Absent input, or input that has
/// nothing left after trimming, yields [`UNKNOWN_SLUG`].
///
/// ```
/// use regatta_common::slugify;
///
/// assert_eq!(slugify(Some("San Francisco")), "san_francisco");
/// assert_eq!(slugify(Some("  Saint-Tropez! ")), "saint_tropez");
/// assert_eq!(slugify(None), "unknown");
/// ```
pub fn slugify(text: Option<&str>) -> String {
    let Some(text) = text else {
        return UNKNOWN_SLUG.to_string();
    };

    let lowered = text.to_lowercase();
    let slug = non_word_re().replace_all(&lowered, "_");
    let slug = slug.trim_matches('_');

    if slug.is_empty() {
        UNKNOWN_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Canonical match key for a race name or race folder name.
///
/// Lower-cases, treats `-` and `_` as spaces, collapses whitespace runs and trims.
/// Absent or empty input yields an empty key. Idempotent.
///
/// ```
/// use regatta_common::normalize_race_name;
///
/// assert_eq!(normalize_race_name(Some("Race 1")), "race 1");
/// assert_eq!(normalize_race_name(Some("race_1")), "race 1");
/// assert_eq!(normalize_race_name(Some("Final-Race")), "final race");
/// ```
pub fn normalize_race_name(name: Option<&str>) -> String {
    let Some(name) = name else {
        return String::new();
    };

    name.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Folder name the capture layout uses for a race (`Race 1` → `race_1`).
pub fn race_folder_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_slug_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
    }

    #[test]
    fn test_slugify_basic_city() {
        assert_eq!(slugify(Some("Sydney")), "sydney");
        assert_eq!(slugify(Some("San Francisco")), "san_francisco");
        assert_eq!(slugify(Some("Saint-Tropez")), "saint_tropez");
    }

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify(Some("Great  --  Britain")), "great_britain");
        assert_eq!(slugify(Some("a & b / c")), "a_b_c");
    }

    #[test]
    fn test_slugify_trims_underscores() {
        assert_eq!(slugify(Some("__Cadiz__")), "cadiz");
        assert_eq!(slugify(Some("(Bermuda)")), "bermuda");
    }

    #[test]
    fn test_slugify_sentinel_for_absent_or_empty() {
        assert_eq!(slugify(None), UNKNOWN_SLUG);
        assert_eq!(slugify(Some("")), UNKNOWN_SLUG);
        assert_eq!(slugify(Some("!!!")), UNKNOWN_SLUG);
    }

    #[test]
    fn test_slugify_charset_over_awkward_inputs() {
        let inputs = [
            "São Paulo",
            "Zürich Regatta 2024",
            "  leading and trailing  ",
            "Dubai\tNight\nRace",
            "ÅÄÖ",
            "x",
            "Under_score kept",
            "😀 Emoji City 😀",
        ];
        for input in inputs {
            let slug = slugify(Some(input));
            assert!(slug.chars().all(is_slug_char), "{input:?} -> {slug:?}");
            assert!(!slug.starts_with('_'), "{input:?} -> {slug:?}");
            assert!(!slug.ends_with('_'), "{input:?} -> {slug:?}");
            assert!(!slug.is_empty());
        }
        assert_eq!(slugify(Some("Under_score kept")), "under_score_kept");
    }

    #[test]
    fn test_normalize_race_name_separators_and_case() {
        assert_eq!(normalize_race_name(Some("Race 1")), "race 1");
        assert_eq!(normalize_race_name(Some("race_1")), "race 1");
        assert_eq!(normalize_race_name(Some("RACE-1")), "race 1");
        assert_eq!(normalize_race_name(Some("  Race 1  ")), "race 1");
    }

    #[test]
    fn test_normalize_race_name_adversarial_equivalents() {
        let key = normalize_race_name(Some("Final Race"));
        for variant in [
            "final race",
            "FINAL RACE",
            "Final-Race",
            "final_race",
            "Final  Race",
            "Final - Race",
            "final__race",
            "\tFinal Race\n",
            "Final_-_Race",
        ] {
            assert_eq!(normalize_race_name(Some(variant)), key, "variant {variant:?}");
        }
    }

    #[test]
    fn test_normalize_race_name_empty() {
        assert_eq!(normalize_race_name(None), "");
        assert_eq!(normalize_race_name(Some("")), "");
        assert_eq!(normalize_race_name(Some(" - _ ")), "");
    }

    #[test]
    fn test_normalize_race_name_idempotent() {
        for input in ["Race 1", "race_1", "Final--Race", "  A_b-C  d ", "", "Match Race 3 (Final)"] {
            let once = normalize_race_name(Some(input));
            let twice = normalize_race_name(Some(once.as_str()));
            assert_eq!(once, twice, "input {input:?}");
        }
    }

    #[test]
    fn test_race_folder_name_joins_back() {
        for name in ["Race 1", "Final Race", "Race-2 Rerun", "Match  Race"] {
            let folder = race_folder_name(name);
            assert!(!folder.contains(' '));
            assert_eq!(
                normalize_race_name(Some(folder.as_str())),
                normalize_race_name(Some(name)),
                "name {name:?}"
            );
        }
    }
}
