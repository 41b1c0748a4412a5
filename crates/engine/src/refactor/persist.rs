//! Writing rewritten documents back to storage.

use std::io;
use std::path::{Path, PathBuf};

use stepwright_types::{ConceptDictionary, Specification};
use stepwright_util::save_file;
use tracing::{info, warn};

use super::error::RefactorError;
use super::rewrite::RenameOutcome;
use crate::formatter::{format_concept_document, format_specification};

/// Destination for formatted documents.
pub trait DocumentWriter: Send + Sync {
    /// Replace the contents of `path`.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Writes documents to the local filesystem, overwriting existing files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocumentWriter;

impl DocumentWriter for FsDocumentWriter {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        save_file(path, contents, true)
    }
}

/// Files written and files that could not be.
#[derive(Debug, Default)]
pub struct WrittenDocuments {
    pub specs: Vec<PathBuf>,
    pub concepts: Vec<PathBuf>,
    pub errors: Vec<RefactorError>,
}

/// Format and write every document the rewrite flagged as changed.
///
/// A failed write is recorded and the remaining documents are still written.
pub fn write_changed_documents(
    specs: &[Specification],
    dictionary: &ConceptDictionary,
    outcome: &RenameOutcome,
    writer: &dyn DocumentWriter,
) -> WrittenDocuments {
    let mut written = WrittenDocuments::default();

    for spec in specs {
        if outcome.specs_changed.get(&spec.file_name).copied().unwrap_or(false) {
            let text = format_specification(spec);
            persist(writer, &spec.file_name, &text, &mut written.specs, &mut written.errors);
        }
    }

    for document in &dictionary.documents {
        if outcome
            .concept_files_changed
            .get(&document.file_name)
            .copied()
            .unwrap_or(false)
        {
            let text = format_concept_document(document);
            persist(writer, &document.file_name, &text, &mut written.concepts, &mut written.errors);
        }
    }

    written
}

fn persist(writer: &dyn DocumentWriter, path: &Path, text: &str, files: &mut Vec<PathBuf>, errors: &mut Vec<RefactorError>) {
    match writer.write(path, text) {
        Ok(()) => {
            info!(file = %path.display(), "document rewritten");
            files.push(path.to_path_buf());
        }
        Err(error) => {
            warn!(file = %path.display(), %error, "failed to write document");
            errors.push(RefactorError::PersistFailure {
                file: path.to_path_buf(),
                message: error.to_string(),
            });
        }
    }
}
