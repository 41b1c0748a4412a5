//! Local discovery listener a launched runner dials back into.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::debug;

use crate::errors::RunnerError;

/// Localhost TCP listener handed to a runner through its environment.
#[derive(Debug)]
pub struct DiscoveryService {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl DiscoveryService {
    /// Bind the listener on `127.0.0.1:port`; `0` selects a free port.
    pub async fn start(port: u16) -> Result<Self, RunnerError> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|error| RunnerError::discovery(format!("failed to bind port {port}: {error}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|error| RunnerError::discovery(error.to_string()))?;
        debug!(address = %local_addr, "discovery service listening");
        Ok(Self { listener, local_addr })
    }

    /// Port actually bound.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Wait for the runner to connect.
    pub async fn accept(&self, wait: Duration) -> Result<TcpStream, RunnerError> {
        match timeout(wait, self.listener.accept()).await {
            Ok(Ok((stream, peer))) => {
                debug!(peer = %peer, "runner connected");
                Ok(stream)
            }
            Ok(Err(error)) => Err(RunnerError::discovery(format!("accept failed: {error}"))),
            Err(_) => Err(RunnerError::timeout("runner connection", wait.as_millis() as u64)),
        }
    }
}
