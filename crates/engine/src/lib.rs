//! # Stepwright Engine
//!
//! The Stepwright Engine parses specification and concept documents, renders
//! them back to canonical text, and renames step phrases across documents and
//! the runner that implements them.
//!
//! ## Key Features
//!
//! - **Spec Parsing**: Line-oriented `.spec` and `.cpt` documents with static
//!   (`"..."`) and dynamic (`<...>`) step arguments
//! - **Canonical Formatting**: Stable text rendering of rewritten documents
//! - **Rename Refactoring**: Parameter-aware step renames with an itemized,
//!   partially-failable result
//!
//! ## Usage
//!
//! ```rust
//! use stepwright_engine::{format_specification, parse_specification_file};
//!
//! let temp_dir = tempfile::tempdir()?;
//! let spec_path = temp_dir.path().join("bank.spec");
//! std::fs::write(&spec_path, "# Bank\n## Deposit\n* enter <amount> dollars\n")?;
//!
//! let (specification, parse_result) = parse_specification_file(&spec_path)?;
//! assert!(parse_result.ok);
//! println!("{}", format_specification(&specification));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`parser`**: Tokenizer and document parsers
//! - **`formatter`**: Canonical text rendering
//! - **`step_value`**: Runner-facing step values
//! - **`source`**: Loading documents from a project
//! - **`refactor`**: Order mapping, document rewrite, persistence and runner coordination

use std::{fs, path::Path};

use anyhow::{Context, Result};
use stepwright_types::{ParseResult, Specification};

pub mod formatter;
pub mod parser;
pub mod refactor;
pub mod source;
pub mod step_value;

pub use formatter::{format_concept_document, format_specification};
pub use parser::{build_concept_dictionary, parse_concept_document, parse_specification, parse_step};
pub use refactor::{
    Collaborators, DocumentWriter, FsDocumentWriter, OrderMap, RefactorError, RefactoringResult, RephraseRefactorer, RunnerTimeouts,
    perform_rephrase_refactoring,
};
pub use source::{DocumentSource, FsDocumentSource};
pub use step_value::extract_step_value;

/// Reads and parses a single specification file.
///
/// # Errors
///
/// Returns an error if the file cannot be read. Problems inside the document
/// are reported through the returned [`ParseResult`].
pub fn parse_specification_file(file_path: impl AsRef<Path>) -> Result<(Specification, ParseResult)> {
    let file_path = file_path.as_ref();
    let content =
        fs::read_to_string(file_path).with_context(|| format!("Failed to read specification file: {}", file_path.display()))?;
    Ok(parse_specification(&content, file_path))
}
