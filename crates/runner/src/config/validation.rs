//! Validation for runner configuration.

use thiserror::Error;

use crate::config::RunnerConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("runner '{language}' has an empty command")]
    EmptyCommand { language: String },

    #[error("runner language name cannot be empty")]
    EmptyLanguage,

    #[error("timeout '{name}' must be greater than zero")]
    ZeroTimeout { name: &'static str },
}

/// Validate a loaded configuration before it is used to launch anything.
pub fn validate_config(config: &RunnerConfig) -> Result<(), ValidationError> {
    for (language, runner) in &config.runners {
        if language.trim().is_empty() {
            return Err(ValidationError::EmptyLanguage);
        }
        if runner.command.trim().is_empty() {
            return Err(ValidationError::EmptyCommand {
                language: language.clone(),
            });
        }
    }

    let timeouts = [
        ("runnerConnectionMs", config.timeouts.runner_connection_ms),
        ("runnerRequestMs", config.timeouts.runner_request_ms),
        ("refactorMs", config.timeouts.refactor_ms),
    ];
    if let Some((name, _)) = timeouts.into_iter().find(|(_, value)| *value == 0) {
        return Err(ValidationError::ZeroTimeout { name });
    }
    Ok(())
}
