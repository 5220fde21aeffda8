//! Configuration resolution tests
//!
//! Uses serial_test because the tests manipulate REGATTA_CONFIG.

use regatta_common::config::{
    resolve_config_source, user_config_file, ConfigSource, TomlConfig, CONFIG_ENV_VAR,
};
use regatta_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
#[serial]
fn test_cli_argument_wins_over_environment() {
    let dir = TempDir::new().unwrap();
    let cli = write_config(&dir, "cli.toml", "[logging]\nlevel = \"debug\"\n");
    let envf = write_config(&dir, "env.toml", "[logging]\nlevel = \"warn\"\n");
    env::set_var(CONFIG_ENV_VAR, &envf);

    let (config, source) = TomlConfig::load(Some(cli.as_path())).unwrap();

    assert_eq!(source, ConfigSource::CommandLine(cli));
    assert_eq!(config.logging.level, "debug");

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_environment_variable_used_without_cli() {
    let dir = TempDir::new().unwrap();
    let envf = write_config(
        &dir,
        "env.toml",
        "[paths]\ndata_dir = \"/srv/captures\"\n[audit]\nterminal_status = \"Finished\"\n",
    );
    env::set_var(CONFIG_ENV_VAR, &envf);

    let (config, source) = TomlConfig::load(None).unwrap();

    assert_eq!(source, ConfigSource::Environment(envf));
    assert_eq!(config.paths.data_dir, std::path::PathBuf::from("/srv/captures"));
    assert_eq!(config.audit.terminal_status, "Finished");
    assert_eq!(config.audit.timestamp_tolerance_ms, 1000);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_explicit_missing_file_is_fatal() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = TomlConfig::load(Some(missing.as_path()));
    assert!(matches!(result, Err(Error::Config(_))));

    env::set_var(CONFIG_ENV_VAR, &missing);
    let result = resolve_config_source(None);
    assert!(matches!(result, Err(Error::Config(_))));
    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_unparsable_file_is_fatal() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let broken = write_config(&dir, "broken.toml", "[audit\ntimestamp_tolerance_ms = ");

    let err = TomlConfig::load(Some(broken.as_path())).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("Failed to parse"));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
#[serial]
fn test_invalid_values_rejected_on_load() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bad.toml", "[audit]\ntimestamp_tolerance_ms = -5\n");

    assert!(matches!(TomlConfig::load(Some(path.as_path())), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_defaults_without_any_file() {
    env::remove_var(CONFIG_ENV_VAR);
    let user_file_present = user_config_file().map_or(false, |p| p.is_file());
    let local_file_present = std::path::Path::new("regatta.toml").is_file();
    if user_file_present || local_file_present {
        return;
    }

    let (config, source) = TomlConfig::load(None).unwrap();
    assert_eq!(source, ConfigSource::CompiledDefaults);
    assert_eq!(config, TomlConfig::default());
}
