//! regatta-ingest - season feed normalizer
//!
//! Reads `season_<n>.json` feeds, writes the canonical `races-data.json`
//! document, and prints per-season counts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use regatta_common::config::{pick_path, TomlConfig};
use regatta_common::logging::init_tracing;
use regatta_ingest::SeasonAggregator;
use tracing::{info, warn};

/// Command-line arguments for regatta-ingest
#[derive(Parser, Debug)]
#[command(name = "regatta-ingest")]
#[command(about = "Normalize league season feeds into the canonical race document")]
#[command(version)]
struct Args {
    /// Configuration file (TOML); REGATTA_CONFIG is consulted when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding season_<n>.json feeds
    #[arg(long, env = "REGATTA_FEED_DIR")]
    feed_dir: Option<PathBuf>,

    /// Canonical document to write
    #[arg(short, long, env = "REGATTA_DOCUMENT")]
    output: Option<PathBuf>,

    /// Season number to read (repeatable; default: configured set)
    #[arg(short, long = "season")]
    seasons: Vec<u32>,

    /// Abort when two events of a season share a key
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config.logging).context("Failed to initialize logging")?;

    // Log build identification immediately after tracing init
    info!(
        "Starting regatta-ingest v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Configuration: {}", source);

    let feed_dir = pick_path(args.feed_dir, &config.paths.feed_dir);
    let output = pick_path(args.output, &config.paths.document);
    let seasons = if args.seasons.is_empty() {
        config.ingest.seasons.clone()
    } else {
        args.seasons
    };
    let strict = args.strict || config.ingest.strict;

    info!("Feed directory: {}", feed_dir.display());
    if !feed_dir.is_dir() {
        warn!("Feed directory {} does not exist", feed_dir.display());
    }

    let (document, summary) = SeasonAggregator::new(&feed_dir, seasons)
        .strict(strict)
        .run()
        .context("Normalization aborted")?;

    if summary.event_conflict_count() > 0 {
        warn!(
            "{} events rejected for duplicate keys (see summary)",
            summary.event_conflict_count()
        );
    }
    if document.is_empty() {
        warn!("No season feeds found in {}", feed_dir.display());
    }

    document
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("✓ Wrote {} ({} races)", output.display(), document.race_count());

    print!("{}", summary.render(&output));
    Ok(())
}
