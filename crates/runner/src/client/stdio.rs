//! Process helpers for launching runners.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::info;

use stepwright_util::PROJECT_ROOT_ENV;

use crate::config::RunnerCommand;

use super::launcher::INTERNAL_PORT_ENV;

/// Build a configured `tokio::process::Command` for a runner.
pub(crate) fn build_runner_command(runner: &RunnerCommand, port: u16, project_root: &Path) -> Command {
    let mut cmd = Command::new(&runner.command);
    cmd.args(&runner.args);
    for (key, value) in &runner.env {
        cmd.env(key, value);
    }
    cmd.env(INTERNAL_PORT_ENV, port.to_string());
    cmd.env(PROJECT_ROOT_ENV, project_root);
    cmd.current_dir(runner.cwd.as_deref().unwrap_or(project_root));
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Spawn a background task that forwards runner output lines to tracing.
pub(crate) fn spawn_output_logger<R>(language: String, stream_name: &'static str, output: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(output).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            info!(target: "stepwright::runner", runner = %language, stream = stream_name, "{line}");
        }
    });
}
