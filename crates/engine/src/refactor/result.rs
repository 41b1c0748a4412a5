use std::path::PathBuf;

use serde::{Serialize, Serializer};
use stepwright_types::ParseResult;

use super::error::RefactorError;

/// Itemized account of one refactor attempt.
///
/// Failure is sticky: once an error is recorded the result never reports
/// success again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactoringResult {
    success: bool,
    /// A concept's defining phrase was renamed.
    pub concept_renamed: bool,
    pub specs_changed: Vec<PathBuf>,
    pub concepts_changed: Vec<PathBuf>,
    pub runner_files_changed: Vec<String>,
    #[serde(serialize_with = "serialize_errors")]
    errors: Vec<RefactorError>,
    pub warnings: Vec<String>,
}

impl RefactoringResult {
    /// An optimistic result for the pre-check stage.
    pub fn started() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// A result that succeeds only once [`RefactoringResult::mark_succeeded`]
    /// is called.
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn failure(error: RefactorError) -> Self {
        let mut result = Self::default();
        result.record_error(error);
        result
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn errors(&self) -> &[RefactorError] {
        &self.errors
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn record_error(&mut self, error: RefactorError) {
        self.success = false;
        self.errors.push(error);
    }

    /// Record the errors and warnings of a document parse.
    pub fn absorb_parse_result(&mut self, parse_result: &ParseResult) {
        if !parse_result.ok {
            self.success = false;
        }
        for error in &parse_result.errors {
            self.record_error(RefactorError::ParseFailure(error.to_string()));
        }
        self.warnings.extend(parse_result.warnings.iter().map(ToString::to_string));
    }

    pub fn append_warnings(&mut self, warnings: impl IntoIterator<Item = String>) {
        self.warnings.extend(warnings);
    }

    /// Flip to success, unless an error was already recorded.
    pub fn mark_succeeded(&mut self) {
        self.success = self.errors.is_empty();
    }

    /// Every changed file: specifications, then concepts, then runner files.
    pub fn all_files_changed(&self) -> Vec<PathBuf> {
        self.specs_changed
            .iter()
            .chain(self.concepts_changed.iter())
            .cloned()
            .chain(self.runner_files_changed.iter().map(PathBuf::from))
            .collect()
    }
}

fn serialize_errors<S: Serializer>(errors: &[RefactorError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}
