use std::path::PathBuf;

use thiserror::Error;

/// Why a refactor, or one of its stages, failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefactorError {
    #[error("Same old step name and new step name.")]
    InvalidInput,

    #[error("{0}")]
    ParseFailure(String),

    #[error("{0}")]
    DiscoveryFailure(String),

    #[error("Step implementation not found: {line_text}")]
    StepNotImplemented { line_text: String },

    #[error("steps with aliases : '{}' cannot be refactored.", .aliases.join("', '"))]
    AliasedStepUnrefactorable { aliases: Vec<String> },

    #[error("{0}")]
    TransportTimeout(String),

    #[error("{0}")]
    TransportFailure(String),

    #[error("{0}")]
    RunnerRejected(String),

    #[error("Failed to write {}: {message}", .file.display())]
    PersistFailure { file: PathBuf, message: String },

    /// Runner-side failure after the documents were already rewritten.
    #[error("Only spec files and concepts refactored: {0}")]
    PartialRefactor(Box<RefactorError>),
}

impl RefactorError {
    /// The underlying error, looking through [`RefactorError::PartialRefactor`].
    pub fn root(&self) -> &RefactorError {
        match self {
            Self::PartialRefactor(inner) => inner.root(),
            other => other,
        }
    }

    pub fn partial(inner: RefactorError) -> Self {
        Self::PartialRefactor(Box::new(inner))
    }
}
