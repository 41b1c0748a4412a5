//! Outcome records of parsing specification and concept documents.

use std::{error::Error, fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

/// A fatal problem found while parsing a document or a step phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub file_name: Option<PathBuf>,
    pub line_no: usize,
    pub message: String,
    pub line_text: String,
}

impl ParseError {
    pub fn new(line_no: usize, message: impl Into<String>, line_text: impl Into<String>) -> Self {
        Self {
            file_name: None,
            line_no,
            message: message.into(),
            line_text: line_text.into(),
        }
    }

    pub fn in_file(mut self, file_name: impl Into<PathBuf>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file_name) = &self.file_name {
            write!(f, "{}:{} ", file_name.display(), self.line_no)?;
        } else if self.line_no > 0 {
            write!(f, "line {}: ", self.line_no)?;
        }
        write!(f, "{}", self.message)?;
        if !self.line_text.is_empty() {
            write!(f, " => '{}'", self.line_text)?;
        }
        Ok(())
    }
}

impl Error for ParseError {}

/// A non-fatal observation made while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub file_name: PathBuf,
    pub line_no: usize,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.file_name.display(), self.line_no, self.message)
    }
}

/// Per-document parse outcome: `ok` is false whenever `errors` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub ok: bool,
    pub file_name: Option<PathBuf>,
    pub errors: Vec<ParseError>,
    pub warnings: Vec<Warning>,
}

impl ParseResult {
    pub fn ok(file_name: impl Into<PathBuf>) -> Self {
        Self {
            ok: true,
            file_name: Some(file_name.into()),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: ParseError) {
        self.ok = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}
