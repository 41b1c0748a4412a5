use std::time::Duration;

use async_trait::async_trait;
use stepwright_types::Message;

use crate::errors::RunnerError;

/// A connected runner able to answer requests.
///
/// Sessions are scoped: whoever obtains one must call [`RunnerSession::release`]
/// on every exit path. Releasing twice is a no-op.
#[async_trait]
pub trait RunnerSession: Send {
    /// Send `message` and wait at most `timeout` for its reply.
    async fn request(&mut self, message: Message, timeout: Duration) -> Result<Message, RunnerError>;

    /// Ask the runner to stop and free the connection.
    async fn release(&mut self);
}

/// Starts (or attaches to) a runner and hands back a connected session.
#[async_trait]
pub trait RunnerLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn RunnerSession>, RunnerError>;
}
