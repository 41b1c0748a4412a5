//! Loading documents from a project.

use std::fs;
use std::path::{Path, PathBuf};

use stepwright_types::{ConceptDictionary, ParseError, ParseResult, Specification};
use tracing::debug;

use crate::parser::{build_concept_dictionary, parse_concept_document, parse_specification};

/// Directory below the project root holding specifications and concepts.
pub const SPECS_DIR: &str = "specs";
pub const SPEC_EXTENSION: &str = "spec";
pub const CONCEPT_EXTENSION: &str = "cpt";

/// Supplies the parsed documents a refactor operates on.
pub trait DocumentSource: Send + Sync {
    /// Parse every specification; one parse result per document.
    fn find_specifications(&self) -> (Vec<Specification>, Vec<ParseResult>);

    /// Parse every concept document into one dictionary.
    fn build_concept_dictionary(&self) -> (ConceptDictionary, ParseResult);
}

/// Reads documents from `<project root>/specs`, recursively and in path order.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    specs_dir: PathBuf,
}

impl FsDocumentSource {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            specs_dir: project_root.as_ref().join(SPECS_DIR),
        }
    }

    fn files_with_extension(&self, extension: &str) -> Vec<PathBuf> {
        let mut files = Vec::new();
        collect_files(&self.specs_dir, extension, &mut files);
        files.sort();
        debug!(dir = %self.specs_dir.display(), extension, count = files.len(), "collected documents");
        files
    }
}

fn collect_files(dir: &Path, extension: &str, files: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, extension, files);
        } else if path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
}

fn unreadable(path: &Path, error: std::io::Error) -> ParseResult {
    let mut result = ParseResult::ok(path);
    result.add_error(ParseError::new(0, format!("Failed to read file: {error}"), "").in_file(path));
    result
}

impl DocumentSource for FsDocumentSource {
    fn find_specifications(&self) -> (Vec<Specification>, Vec<ParseResult>) {
        let mut specs = Vec::new();
        let mut results = Vec::new();
        for path in self.files_with_extension(SPEC_EXTENSION) {
            match fs::read_to_string(&path) {
                Ok(text) => {
                    let (spec, result) = parse_specification(&text, &path);
                    specs.push(spec);
                    results.push(result);
                }
                Err(error) => results.push(unreadable(&path, error)),
            }
        }
        (specs, results)
    }

    fn build_concept_dictionary(&self) -> (ConceptDictionary, ParseResult) {
        let mut documents = Vec::new();
        let mut combined = ParseResult {
            ok: true,
            ..ParseResult::default()
        };

        for path in self.files_with_extension(CONCEPT_EXTENSION) {
            let result = match fs::read_to_string(&path) {
                Ok(text) => {
                    let (document, result) = parse_concept_document(&text, &path);
                    documents.push(document);
                    result
                }
                Err(error) => unreadable(&path, error),
            };
            merge(&mut combined, result);
        }

        let (dictionary, result) = build_concept_dictionary(documents);
        merge(&mut combined, result);
        (dictionary, combined)
    }
}

fn merge(into: &mut ParseResult, from: ParseResult) {
    for error in from.errors {
        into.add_error(error);
    }
    into.warnings.extend(from.warnings);
}
