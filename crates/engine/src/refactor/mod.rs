//! Rename refactoring of a step phrase.
//!
//! A rename runs as one sequential workflow:
//!
//! 1. pre-check: parse every specification and concept; any parse error ends
//!    the attempt before anything is modified
//! 2. rewrite matching step occurrences in memory ([`rewrite`])
//! 3. format and write the changed documents ([`persist`])
//! 4. ask the runner to rename the implementation ([`coordinator`])
//!
//! Runner failures do not undo the document changes; the returned
//! [`RefactoringResult`] reports both.

pub mod coordinator;
pub mod error;
pub mod order;
pub mod persist;
pub mod request;
pub mod result;
pub mod rewrite;

pub use coordinator::{RunnerCoordinator, RunnerTimeouts};
pub use error::RefactorError;
pub use order::OrderMap;
pub use persist::{DocumentWriter, FsDocumentWriter, WrittenDocuments, write_changed_documents};
pub use request::{build_refactor_request, generate_new_step_name};
pub use result::RefactoringResult;
pub use rewrite::{RenameOutcome, StepRenamer, rename_in_documents};

use stepwright_runner::config::load_config;
use stepwright_runner::{ProcessLauncher, RunnerLauncher};
use stepwright_types::{ConceptDictionary, Specification, Step};
use stepwright_util::find_project_root;
use tracing::{info, warn};

use crate::parser::parse_step;
use crate::source::{DocumentSource, FsDocumentSource};

/// Everything a refactor reads from or writes to.
pub struct Collaborators<'a> {
    pub source: &'a dyn DocumentSource,
    pub writer: &'a dyn DocumentWriter,
    pub launcher: &'a dyn RunnerLauncher,
    pub timeouts: RunnerTimeouts,
}

/// A validated rename of one step phrase to another.
#[derive(Debug, Clone)]
pub struct RephraseRefactorer {
    old_step: Step,
    new_step: Step,
}

impl RephraseRefactorer {
    /// Parse both phrases. Identical phrases are rejected before parsing.
    pub fn new(old_phrase: &str, new_phrase: &str) -> Result<Self, RefactorError> {
        if old_phrase == new_phrase {
            return Err(RefactorError::InvalidInput);
        }
        let old_step = parse_step(old_phrase, 1).map_err(|error| RefactorError::ParseFailure(error.to_string()))?;
        let new_step = parse_step(new_phrase, 2).map_err(|error| RefactorError::ParseFailure(error.to_string()))?;
        Ok(Self { old_step, new_step })
    }

    pub fn old_step(&self) -> &Step {
        &self.old_step
    }

    pub fn new_step(&self) -> &Step {
        &self.new_step
    }

    pub fn order_map(&self) -> OrderMap {
        OrderMap::between(&self.old_step, &self.new_step)
    }

    /// Run the whole rename against `collaborators`.
    pub async fn perform(&self, collaborators: &Collaborators<'_>) -> RefactoringResult {
        let mut precheck = RefactoringResult::started();

        let (mut specs, spec_results) = collaborators.source.find_specifications();
        for parse_result in &spec_results {
            precheck.absorb_parse_result(parse_result);
        }
        if !precheck.is_success() {
            warn!(errors = precheck.errors().len(), "specifications failed to parse");
            return precheck;
        }

        let (mut dictionary, concept_result) = collaborators.source.build_concept_dictionary();
        precheck.absorb_parse_result(&concept_result);
        if !precheck.is_success() {
            warn!(errors = precheck.errors().len(), "concepts failed to parse");
            return precheck;
        }

        let mut result = self.perform_on(&mut specs, &mut dictionary, collaborators).await;
        result.append_warnings(precheck.warnings);
        result
    }

    async fn perform_on(
        &self,
        specs: &mut [Specification],
        dictionary: &mut ConceptDictionary,
        collaborators: &Collaborators<'_>,
    ) -> RefactoringResult {
        let order = self.order_map();
        let renamer = StepRenamer::new(&self.old_step, &self.new_step, &order);
        let outcome = rename_in_documents(specs, dictionary, &renamer);
        let written = write_changed_documents(specs, dictionary, &outcome, collaborators.writer);

        let mut result = RefactoringResult::pending();
        result.concept_renamed = outcome.concept_renamed;
        result.specs_changed = written.specs;
        result.concepts_changed = written.concepts;
        result.append_warnings(outcome.warnings);
        for error in written.errors {
            result.record_error(error);
        }
        info!(
            specs = result.specs_changed.len(),
            concepts = result.concepts_changed.len(),
            "documents refactored"
        );

        let coordinator = RunnerCoordinator::new(collaborators.launcher, collaborators.timeouts);
        match coordinator.refactor(&self.old_step, &self.new_step, &order).await {
            Ok(files) => {
                result.runner_files_changed = files;
                result.mark_succeeded();
            }
            Err(error) => result.record_error(error),
        }
        result
    }
}

/// Rename `old_phrase` to `new_phrase` in the project containing the current
/// directory, using the configured runner.
pub async fn perform_rephrase_refactoring(old_phrase: &str, new_phrase: &str) -> RefactoringResult {
    let refactorer = match RephraseRefactorer::new(old_phrase, new_phrase) {
        Ok(refactorer) => refactorer,
        Err(error) => return RefactoringResult::failure(error),
    };

    let project_root = match find_project_root() {
        Ok(root) => root,
        Err(error) => return RefactoringResult::failure(RefactorError::DiscoveryFailure(error.to_string())),
    };
    let config = match load_config() {
        Ok(config) => config,
        Err(error) => {
            return RefactoringResult::failure(RefactorError::DiscoveryFailure(format!(
                "Failed to load runner configuration: {error}"
            )));
        }
    };
    info!(root = %project_root.display(), old = old_phrase, new = new_phrase, "rephrase refactoring");

    let source = FsDocumentSource::new(&project_root);
    let launcher = ProcessLauncher::new(config.clone(), project_root);
    let collaborators = Collaborators {
        source: &source,
        writer: &FsDocumentWriter,
        launcher: &launcher,
        timeouts: RunnerTimeouts::from(&config.timeouts),
    };
    refactorer.perform(&collaborators).await
}
