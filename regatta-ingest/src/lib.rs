//! regatta-ingest: season feed normalization
//!
//! Turns the league's loosely-shaped season feeds into the canonical document:
//!
//! ```text
//! season_<n>.json ──► raw::Node ──► event ──► season ──► CanonicalDocument
//!                                   ├─ leaderboard
//!                                   └─ teams
//! ```
//!
//! Only `raw` looks at untyped JSON; everything it hands on is a typed record
//! from `regatta_common::model`.

pub mod event;
pub mod leaderboard;
pub mod raw;
pub mod season;
pub mod teams;

pub use event::{normalize_event, NormalizedEvent};
pub use season::{normalize_season, IngestSummary, SeasonAggregator, SeasonOutcome};
