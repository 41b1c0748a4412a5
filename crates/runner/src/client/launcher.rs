//! Launching configured runner processes.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::discovery::DiscoveryService;
use crate::errors::RunnerError;
use crate::manifest::{Manifest, load_manifest};

use super::connection::RunnerConnection;
use super::handle::RunnerHandle;
use super::session::{RunnerLauncher, RunnerSession};
use super::stdio::{build_runner_command, spawn_output_logger};

/// Environment variable telling the runner which local port to dial.
pub const INTERNAL_PORT_ENV: &str = "STEPWRIGHT_INTERNAL_PORT";

/// Launches the runner for the project's language as a child process.
///
/// The project manifest is read on every launch so a broken manifest only
/// affects the runner stage.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    config: RunnerConfig,
    project_root: PathBuf,
}

impl ProcessLauncher {
    pub fn new(config: RunnerConfig, project_root: PathBuf) -> Self {
        Self { config, project_root }
    }

    fn spawn(&self, manifest: &Manifest, port: u16) -> Result<Child, RunnerError> {
        let language = &manifest.language;
        let runner = self
            .config
            .runners
            .get(language)
            .ok_or_else(|| RunnerError::not_configured(language))?;

        let mut command = build_runner_command(runner, port, &self.project_root);
        let mut child = command
            .spawn()
            .map_err(|error| RunnerError::startup_failed(language, format!("{}: {error}", runner.command)))?;

        if let Some(stdout) = child.stdout.take() {
            spawn_output_logger(language.clone(), "stdout", stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_output_logger(language.clone(), "stderr", stderr);
        }
        Ok(child)
    }
}

#[async_trait]
impl RunnerLauncher for ProcessLauncher {
    async fn launch(&self) -> Result<Box<dyn RunnerSession>, RunnerError> {
        let manifest = load_manifest(&self.project_root).map_err(|error| RunnerError::manifest(error.to_string()))?;
        let language = manifest.language.clone();
        let discovery = DiscoveryService::start(self.config.api_port).await?;
        let mut child = self.spawn(&manifest, discovery.port())?;
        info!(runner = %language, pid = ?child.id(), port = discovery.port(), "runner started");

        let wait = self.config.timeouts.runner_connection();
        let stream = tokio::select! {
            accepted = discovery.accept(wait) => accepted,
            exited = child.wait() => Err(RunnerError::ExitedEarly {
                language: language.clone(),
                status: match exited {
                    Ok(status) => status.to_string(),
                    Err(error) => error.to_string(),
                },
            }),
        };

        let stream = match stream {
            Ok(stream) => stream,
            Err(error) => {
                debug!(runner = %language, %error, "runner failed to connect; terminating");
                terminate(&mut child, &language).await;
                return Err(error);
            }
        };

        Ok(Box::new(RunnerHandle::new(language, child, RunnerConnection::new(stream))))
    }
}

/// Kill a runner that never connected. Returns whether the kill succeeded.
async fn terminate(child: &mut Child, language: &str) -> bool {
    match child.kill().await {
        Ok(()) => true,
        Err(error) => {
            warn!(runner = %language, %error, "failed to kill runner");
            false
        }
    }
}
