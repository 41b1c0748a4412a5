//! Framed JSON connection to a runner.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use stepwright_types::Message;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, trace};

use crate::errors::RunnerError;

/// Upper bound on a single frame; refactor responses list file paths only.
const MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;

/// One newline-delimited JSON message stream with request/response correlation.
pub struct RunnerConnection<S = TcpStream> {
    framed: Framed<S, LinesCodec>,
    next_message_id: u64,
}

impl<S> RunnerConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self {
            framed: Framed::new(stream, LinesCodec::new_with_max_length(MAX_FRAME_LENGTH)),
            next_message_id: 1,
        }
    }

    /// Send a message without waiting for a reply. Returns the assigned id.
    pub async fn send(&mut self, message: Message) -> Result<u64, RunnerError> {
        let message_id = self.next_message_id;
        self.next_message_id += 1;
        let line = serde_json::to_string(&message.with_id(message_id))
            .map_err(|error| RunnerError::protocol(format!("failed to encode message: {error}")))?;
        self.framed
            .send(line)
            .await
            .map_err(|error| RunnerError::transport(error.to_string()))?;
        Ok(message_id)
    }

    /// Send `message` and wait up to `wait` for the reply carrying the same id.
    ///
    /// On timeout the request is abandoned; a late reply is discarded by a later
    /// read because its id no longer matches.
    pub async fn request(&mut self, message: Message, wait: Duration) -> Result<Message, RunnerError> {
        let message_type = message.message_type;
        let message_id = self.send(message).await?;
        debug!(message_id, ?message_type, "sent runner request");

        match timeout(wait, self.read_reply(message_id)).await {
            Ok(reply) => reply,
            Err(_) => Err(RunnerError::timeout(
                format!("{message_type:?}"),
                wait.as_millis() as u64,
            )),
        }
    }

    async fn read_reply(&mut self, message_id: u64) -> Result<Message, RunnerError> {
        loop {
            let line = match self.framed.next().await {
                Some(Ok(line)) => line,
                Some(Err(error)) => return Err(RunnerError::transport(error.to_string())),
                None => return Err(RunnerError::ConnectionClosed),
            };
            if line.trim().is_empty() {
                continue;
            }
            let reply: Message = serde_json::from_str(&line)
                .map_err(|error| RunnerError::protocol(format!("malformed runner message: {error}")))?;
            if reply.message_id == message_id {
                return Ok(reply);
            }
            trace!(expected = message_id, received = reply.message_id, "skipping unrelated runner frame");
        }
    }
}
