//! Configuration IO helpers for runner configuration.

use crate::config::{ConfigError, RunnerConfig, validate_config};
use dirs_next::config_dir;
use stepwright_util::expand_tilde;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const CONFIG_PATH_ENV: &str = "STEPWRIGHT_CONFIG_PATH";
const RUNNER_CONNECTION_TIMEOUT_ENV: &str = "STEPWRIGHT_RUNNER_CONNECTION_TIMEOUT";
const RUNNER_REQUEST_TIMEOUT_ENV: &str = "STEPWRIGHT_RUNNER_REQUEST_TIMEOUT";
const REFACTOR_TIMEOUT_ENV: &str = "STEPWRIGHT_REFACTOR_TIMEOUT";

/// Returns the default path for the runner configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("stepwright").join("config.json")
}

/// Loads runner configuration from the default path.
pub fn load_config() -> Result<RunnerConfig, ConfigError> {
    let path = default_config_path();
    load_config_from_path(&path)
}

/// Loads runner configuration from a specific path, applying environment overrides.
///
/// A missing file yields the defaults.
pub fn load_config_from_path(path: &Path) -> Result<RunnerConfig, ConfigError> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path)?;
        serde_json::from_str::<RunnerConfig>(&content)?
    } else {
        RunnerConfig::default()
    };
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Override timeouts from `STEPWRIGHT_*_TIMEOUT` variables (milliseconds).
pub fn apply_env_overrides(config: &mut RunnerConfig) {
    let overrides = [
        (RUNNER_CONNECTION_TIMEOUT_ENV, &mut config.timeouts.runner_connection_ms),
        (RUNNER_REQUEST_TIMEOUT_ENV, &mut config.timeouts.runner_request_ms),
        (REFACTOR_TIMEOUT_ENV, &mut config.timeouts.refactor_ms),
    ];
    for (name, slot) in overrides {
        let Ok(raw) = env::var(name) else { continue };
        match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 => *slot = value,
            _ => warn!(variable = name, value = %raw, "ignoring invalid timeout override"),
        }
    }
}
