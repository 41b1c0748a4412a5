//! Runner wire messages.
//!
//! Every frame exchanged with a runner is a [`Message`] envelope serialized as a
//! single line of camelCase JSON. Exactly one payload field is populated and it
//! must agree with `messageType`.

use serde::{Deserialize, Serialize};

/// Discriminator of a [`Message`] payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    StepNameRequest,
    StepNameResponse,
    RefactorRequest,
    RefactorResponse,
    KillProcessRequest,
}

/// Runner-side normalized view of a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepValue {
    /// Phrase with `{}` placeholders, e.g. `enter {} dollars`.
    pub step_value: String,
    /// Phrase with named placeholders, e.g. `enter <amount> dollars`.
    pub parameterized_step_value: String,
    /// Parameter values in placeholder order.
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepNameRequest {
    pub step_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepNameResponse {
    #[serde(default)]
    pub is_step_present: bool,
    #[serde(default)]
    pub has_alias: bool,
    #[serde(default)]
    pub step_name: Vec<String>,
}

/// New-to-old parameter correspondence. `old_position` is `-1` for a parameter
/// introduced by the new phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterPosition {
    pub new_position: i32,
    pub old_position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorRequest {
    pub old_step_value: StepValue,
    pub new_step_value: StepValue,
    pub param_positions: Vec<ParameterPosition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub files_changed: Vec<String>,
}

impl RefactorResponse {
    /// A failed response synthesized locally, e.g. after a transport timeout.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            files_changed: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillProcessRequest {}

/// Envelope for every frame on the runner connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Correlates a response with its request. Assigned by the sender.
    #[serde(default)]
    pub message_id: u64,
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_name_request: Option<StepNameRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_name_response: Option<StepNameResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refactor_request: Option<RefactorRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refactor_response: Option<RefactorResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_process_request: Option<KillProcessRequest>,
}

impl Message {
    fn empty(message_type: MessageType) -> Self {
        Self {
            message_id: 0,
            message_type,
            step_name_request: None,
            step_name_response: None,
            refactor_request: None,
            refactor_response: None,
            kill_process_request: None,
        }
    }

    pub fn step_name_request(step_value: impl Into<String>) -> Self {
        Self {
            step_name_request: Some(StepNameRequest {
                step_value: step_value.into(),
            }),
            ..Self::empty(MessageType::StepNameRequest)
        }
    }

    pub fn step_name_response(response: StepNameResponse) -> Self {
        Self {
            step_name_response: Some(response),
            ..Self::empty(MessageType::StepNameResponse)
        }
    }

    pub fn refactor_request(request: RefactorRequest) -> Self {
        Self {
            refactor_request: Some(request),
            ..Self::empty(MessageType::RefactorRequest)
        }
    }

    pub fn refactor_response(response: RefactorResponse) -> Self {
        Self {
            refactor_response: Some(response),
            ..Self::empty(MessageType::RefactorResponse)
        }
    }

    pub fn kill_process_request() -> Self {
        Self {
            kill_process_request: Some(KillProcessRequest {}),
            ..Self::empty(MessageType::KillProcessRequest)
        }
    }

    /// Assign the correlation id, consuming and returning the message.
    pub fn with_id(mut self, message_id: u64) -> Self {
        self.message_id = message_id;
        self
    }
}
