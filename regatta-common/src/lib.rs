//! # Regatta Common Library
//!
//! Shared code for the regatta ingest and audit tools:
//! - Canonical season/event/race/team document model
//! - Slug and race-name normalization (the join key between pipelines)
//! - ISO-8601 timestamp helpers
//! - Configuration loading
//! - Tracing initialisation

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod slug;
pub mod time;

pub use error::{Error, Result};
pub use model::CanonicalDocument;
pub use slug::{normalize_race_name, race_folder_name, slugify};
