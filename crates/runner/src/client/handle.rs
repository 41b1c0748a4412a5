//! A launched runner process together with its connection.

use std::time::Duration;

use async_trait::async_trait;
use stepwright_types::Message;
use tokio::process::Child;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::errors::RunnerError;

use super::connection::RunnerConnection;
use super::session::RunnerSession;

/// How long a runner gets to exit after a kill request before it is killed.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Owned runner process plus its framed connection.
pub struct RunnerHandle {
    language: String,
    child: Child,
    connection: RunnerConnection,
    released: bool,
}

impl RunnerHandle {
    pub fn new(language: String, child: Child, connection: RunnerConnection) -> Self {
        Self {
            language,
            child,
            connection,
            released: false,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Process id of the runner, if it is still running.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}

#[async_trait]
impl RunnerSession for RunnerHandle {
    async fn request(&mut self, message: Message, wait: Duration) -> Result<Message, RunnerError> {
        if self.released {
            return Err(RunnerError::ConnectionClosed);
        }
        self.connection.request(message, wait).await
    }

    async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Err(error) = self.connection.send(Message::kill_process_request()).await {
            debug!(runner = %self.language, %error, "kill request not delivered");
        }
        match timeout(SHUTDOWN_GRACE_PERIOD, self.child.wait()).await {
            Ok(Ok(status)) => debug!(runner = %self.language, %status, "runner exited"),
            Ok(Err(error)) => warn!(runner = %self.language, %error, "failed to wait for runner"),
            Err(_) => {
                warn!(runner = %self.language, "runner ignored kill request; terminating");
                if let Err(error) = self.child.kill().await {
                    warn!(runner = %self.language, %error, "failed to kill runner");
                }
            }
        }
    }
}
