//! Data models for runner configuration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Runner configuration: how to launch each language runner and how long to wait on it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Map of language names to runner launch commands.
    #[serde(default)]
    pub runners: HashMap<String, RunnerCommand>,
    /// Timeouts applied to runner startup and requests.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Port the discovery listener binds on localhost; `0` picks a free port.
    #[serde(default)]
    pub api_port: u16,
}

/// Launch configuration for a single runner.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RunnerCommand {
    /// Executable to start.
    pub command: String,

    /// Arguments to pass to the command.
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment variables to set for the process.
    #[serde(default)]
    pub env: IndexMap<String, String>,

    /// Working directory for the process; defaults to the project root.
    pub cwd: Option<PathBuf>,
}

/// Timeouts in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeoutConfig {
    /// How long a started runner has to dial back into the discovery listener.
    pub runner_connection_ms: u64,
    /// Bound on ordinary runner requests such as step name resolution.
    pub runner_request_ms: u64,
    /// Bound on the refactor request, which rewrites implementation files.
    pub refactor_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            runner_connection_ms: 30_000,
            runner_request_ms: 30_000,
            refactor_ms: 60_000,
        }
    }
}

impl TimeoutConfig {
    pub fn runner_connection(&self) -> Duration {
        Duration::from_millis(self.runner_connection_ms)
    }

    pub fn runner_request(&self) -> Duration {
        Duration::from_millis(self.runner_request_ms)
    }

    pub fn refactor(&self) -> Duration {
        Duration::from_millis(self.refactor_ms)
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] crate::config::ValidationError),

    #[error("Configuration error: {message}")]
    Invalid { message: String },
}
