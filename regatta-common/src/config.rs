//! Configuration loading and config file resolution
//!
//! All settings live in one optional TOML file. Every section and key has a
//! compiled default, so running without any file is the normal case.
//!
//! Config file resolution order:
//! 1. Command-line argument (`--config`)
//! 2. `REGATTA_CONFIG` environment variable
//! 3. `./regatta.toml` in the working directory
//! 4. `<platform config dir>/regatta/config.toml`
//! 5. Compiled defaults
//!
//! A file named explicitly (1 or 2) must exist; implicit locations (3, 4) are
//! only used when present.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "REGATTA_CONFIG";

/// Config file picked up from the working directory
pub const LOCAL_CONFIG_FILE: &str = "regatta.toml";

/// Complete tool configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `season_<n>.json` feed files
    pub feed_dir: PathBuf,
    /// Canonical document written by ingest, read by audit
    pub document: PathBuf,
    /// Root of the capture tree (`<season>/<event>/day_<n>/<race>/`)
    pub data_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            feed_dir: PathBuf::from("races-info"),
            document: PathBuf::from("races-data.json"),
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Normalization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Closed set of season numbers to read
    pub seasons: Vec<u32>,
    /// Abort instead of warning when two events share a key
    pub strict: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            seasons: (1..=6).collect(),
            strict: false,
        }
    }
}

/// Reconciliation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Allowed distance between scheduled start and first packet
    pub timestamp_tolerance_ms: i64,
    /// Boat status the closing packet must report
    pub terminal_status: String,
    /// Extension of capture packet files
    pub capture_extension: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            timestamp_tolerance_ms: 1000,
            terminal_status: "Terminated".to_string(),
            capture_extension: "json".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    WorkingDirectory(PathBuf),
    UserConfigDir(PathBuf),
    CompiledDefaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::CommandLine(p)
            | ConfigSource::Environment(p)
            | ConfigSource::WorkingDirectory(p)
            | ConfigSource::UserConfigDir(p) => Some(p),
            ConfigSource::CompiledDefaults => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::CommandLine(p) => write!(f, "{} (command line)", p.display()),
            ConfigSource::Environment(p) => write!(f, "{} ({})", p.display(), CONFIG_ENV_VAR),
            ConfigSource::WorkingDirectory(p) => write!(f, "{} (working directory)", p.display()),
            ConfigSource::UserConfigDir(p) => write!(f, "{} (user config)", p.display()),
            ConfigSource::CompiledDefaults => write!(f, "compiled defaults"),
        }
    }
}

/// Decide which config file (if any) to read
pub fn resolve_config_source(cli_arg: Option<&Path>) -> Result<ConfigSource> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return require_file(path).map(ConfigSource::CommandLine);
    }

    // Priority 2: Environment variable
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return require_file(Path::new(&path)).map(ConfigSource::Environment);
    }

    // Priority 3: Working directory
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Ok(ConfigSource::WorkingDirectory(local));
    }

    // Priority 4: Platform config directory
    if let Some(user) = user_config_file().filter(|p| p.is_file()) {
        return Ok(ConfigSource::UserConfigDir(user));
    }

    // Priority 5: Compiled defaults
    Ok(ConfigSource::CompiledDefaults)
}

/// `<platform config dir>/regatta/config.toml`
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("regatta").join("config.toml"))
}

fn require_file(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )))
    }
}

impl TomlConfig {
    /// Resolve and load the active configuration
    pub fn load(cli_arg: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let source = resolve_config_source(cli_arg)?;
        let config = match source.path() {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok((config, source))
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Reject settings the tools cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.audit.timestamp_tolerance_ms < 0 {
            return Err(Error::Config(format!(
                "audit.timestamp_tolerance_ms must not be negative (got {})",
                self.audit.timestamp_tolerance_ms
            )));
        }
        if self.audit.terminal_status.trim().is_empty() {
            return Err(Error::Config("audit.terminal_status must not be empty".to_string()));
        }
        if self.audit.capture_extension.trim().is_empty() {
            return Err(Error::Config("audit.capture_extension must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Pick a command-line/environment override over the configured value
pub fn pick_path(override_path: Option<PathBuf>, configured: &Path) -> PathBuf {
    override_path.unwrap_or_else(|| configured.to_path_buf())
}
