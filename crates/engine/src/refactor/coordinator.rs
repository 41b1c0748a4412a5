//! Runner side of a rename: resolve the implementation and ask the runner to
//! rewrite it.

use std::time::Duration;

use stepwright_runner::{RunnerError, RunnerLauncher, RunnerSession, TimeoutConfig};
use stepwright_types::{Message, RefactorResponse, Step};
use tracing::{debug, info, warn};

use super::error::RefactorError;
use super::order::OrderMap;
use super::request::build_refactor_request;

/// Per-request timeouts used while talking to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerTimeouts {
    pub step_name: Duration,
    pub refactor: Duration,
}

impl From<&TimeoutConfig> for RunnerTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            step_name: config.runner_request(),
            refactor: config.refactor(),
        }
    }
}

impl Default for RunnerTimeouts {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    ConnectionEstablished,
    StepNameResolved,
    RequestBuilt,
    ResponseReceived,
    Succeeded,
    Failed,
}

/// Drives one runner-side rename attempt. No retries: a failed stage ends the
/// attempt.
pub struct RunnerCoordinator<'a> {
    launcher: &'a dyn RunnerLauncher,
    timeouts: RunnerTimeouts,
}

impl<'a> RunnerCoordinator<'a> {
    pub fn new(launcher: &'a dyn RunnerLauncher, timeouts: RunnerTimeouts) -> Self {
        Self { launcher, timeouts }
    }

    /// Rename the implementation of `old` to `new`; returns the files the
    /// runner changed.
    ///
    /// The session is released on every path once it has been acquired.
    pub async fn refactor(&self, old: &Step, new: &Step, order: &OrderMap) -> Result<Vec<String>, RefactorError> {
        debug!(stage = ?Stage::Idle, step = %old.value, "starting runner refactor");
        let mut session = match self.launcher.launch().await {
            Ok(session) => session,
            Err(error) => {
                warn!(stage = ?Stage::Failed, %error, "could not connect to runner");
                return Err(RefactorError::DiscoveryFailure(format!("Failed to connect to test runner: {error}")));
            }
        };
        debug!(stage = ?Stage::ConnectionEstablished, "runner connected");

        let outcome = self.run(session.as_mut(), old, new, order).await;
        session.release().await;

        match &outcome {
            Ok(files) => info!(stage = ?Stage::Succeeded, files = files.len(), "runner refactor finished"),
            Err(error) => warn!(stage = ?Stage::Failed, %error, "runner refactor failed"),
        }
        outcome
    }

    async fn run(
        &self,
        session: &mut dyn RunnerSession,
        old: &Step,
        new: &Step,
        order: &OrderMap,
    ) -> Result<Vec<String>, RefactorError> {
        let step_name = self.resolve_step_name(session, old).await?;
        debug!(stage = ?Stage::StepNameResolved, %step_name, "implementation resolved");

        let request = build_refactor_request(&step_name, new, order)
            .map_err(|error| RefactorError::partial(RefactorError::ParseFailure(error.to_string())))?;
        debug!(stage = ?Stage::RequestBuilt, new_step = %request.new_step_value.step_value, "refactor request built");

        let (response, transport_failure) = self.send_refactor_request(session, Message::refactor_request(request)).await;
        debug!(stage = ?Stage::ResponseReceived, success = response.success, "refactor response received");

        if response.success {
            return Ok(response.files_changed);
        }
        let cause = transport_failure.unwrap_or_else(|| RefactorError::RunnerRejected(response.error.unwrap_or_default()));
        Err(RefactorError::partial(cause))
    }

    /// Ask the runner for the implementation name of `old`.
    async fn resolve_step_name(&self, session: &mut dyn RunnerSession, old: &Step) -> Result<String, RefactorError> {
        let reply = session
            .request(Message::step_name_request(old.value.clone()), self.timeouts.step_name)
            .await
            .map_err(|error| transport_error(&error))?;
        let response = reply.step_name_response.ok_or_else(|| {
            RefactorError::TransportFailure(format!("runner replied with {:?} to a step name request", reply.message_type))
        })?;

        if !response.is_step_present {
            return Err(RefactorError::StepNotImplemented {
                line_text: old.line_text.clone(),
            });
        }
        if response.has_alias {
            return Err(RefactorError::AliasedStepUnrefactorable {
                aliases: response.step_name,
            });
        }
        response
            .step_name
            .into_iter()
            .next()
            .ok_or_else(|| RefactorError::StepNotImplemented {
                line_text: old.line_text.clone(),
            })
    }

    /// Send the refactor request. Transport problems become a failed response
    /// so callers see one shape; the typed cause is returned alongside.
    async fn send_refactor_request(
        &self,
        session: &mut dyn RunnerSession,
        message: Message,
    ) -> (RefactorResponse, Option<RefactorError>) {
        match session.request(message, self.timeouts.refactor).await {
            Ok(reply) => match reply.refactor_response {
                Some(response) => {
                    if !response.success {
                        warn!(error = ?response.error, "runner rejected refactor");
                    }
                    (response, None)
                }
                None => {
                    let message = format!("runner replied with {:?} to a refactor request", reply.message_type);
                    (RefactorResponse::failed(message.clone()), Some(RefactorError::TransportFailure(message)))
                }
            },
            Err(error) => {
                let cause = transport_error(&error);
                (RefactorResponse::failed(error.to_string()), Some(cause))
            }
        }
    }
}

fn transport_error(error: &RunnerError) -> RefactorError {
    if error.is_timeout() {
        RefactorError::TransportTimeout(error.to_string())
    } else {
        RefactorError::TransportFailure(error.to_string())
    }
}
