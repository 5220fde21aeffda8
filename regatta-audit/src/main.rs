//! regatta-audit - capture reconciliation report
//!
//! Compares the capture tree under the data directory with the canonical
//! document and prints a completeness report, or lists where each expected
//! race's captures belong.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use regatta_audit::{
    build_expected_index, plan_captures, render_plan, CaptureScanner, Reconciler, ReportFormatter,
};
use regatta_common::config::{pick_path, TomlConfig};
use regatta_common::logging::init_tracing;
use regatta_common::CanonicalDocument;
use tracing::info;

/// Command-line arguments for regatta-audit
#[derive(Parser, Debug)]
#[command(name = "regatta-audit")]
#[command(about = "Reconcile captured race data against the canonical race document")]
#[command(version)]
struct Args {
    /// Configuration file (TOML); REGATTA_CONFIG is consulted when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Canonical document to read
    #[arg(short, long, global = true, env = "REGATTA_DOCUMENT")]
    document: Option<PathBuf>,

    /// Root of the capture tree
    #[arg(long, global = true, env = "REGATTA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the completeness report (default)
    Report {
        /// Also write the full result as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// List where each expected race's captures belong
    Plan,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config.logging).context("Failed to initialize logging")?;

    // Log build identification immediately after tracing init
    info!(
        "Starting regatta-audit v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Configuration: {}", source);

    let document_path = pick_path(args.document, &config.paths.document);
    let data_dir = pick_path(args.data_dir, &config.paths.data_dir);

    let document = CanonicalDocument::load(&document_path)
        .with_context(|| format!("Failed to load {}", document_path.display()))?;
    info!(
        "Loaded {} ({} seasons, {} races)",
        document_path.display(),
        document.len(),
        document.race_count()
    );

    match args.command.unwrap_or(Command::Report { json: None }) {
        Command::Plan => {
            let plan = plan_captures(&document);
            print!("{}", render_plan(&plan, &data_dir));
        }
        Command::Report { json } => {
            let expected = build_expected_index(&document);
            let downloaded = CaptureScanner::new(&data_dir)
                .scan()
                .with_context(|| format!("Failed to scan {}", data_dir.display()))?;
            info!(
                "Expected races: {}, downloaded race folders: {}",
                expected.len(),
                downloaded.len()
            );

            let report = Reconciler::from_config(&config.audit).reconcile(&expected, &downloaded);
            print!("{}", ReportFormatter::format(&report, &document_path));

            if let Some(path) = json {
                report
                    .export_json(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("✓ Wrote JSON report to {}", path.display());
            }
        }
    }

    Ok(())
}
