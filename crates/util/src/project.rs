//! Project root discovery.
//!
//! A project is any directory holding a `manifest.json`. The root is resolved from
//! the `STEPWRIGHT_PROJECT_ROOT` override first, then by walking up from the
//! starting directory.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::expand_tilde;

/// File that marks a project root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Environment variable overriding project root discovery.
pub const PROJECT_ROOT_ENV: &str = "STEPWRIGHT_PROJECT_ROOT";

#[derive(Debug, Error)]
pub enum ProjectRootError {
    #[error("Failed to find project directory containing {MANIFEST_FILE} (searched upward from {start})")]
    NotFound { start: String },

    #[error("{PROJECT_ROOT_ENV} is set to '{path}' but it does not contain {MANIFEST_FILE}")]
    InvalidOverride { path: String },

    #[error("Failed to determine working directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve the project root starting from the current working directory.
pub fn find_project_root() -> Result<PathBuf, ProjectRootError> {
    let start = env::current_dir()?;
    find_project_root_from(&start)
}

/// Resolve the project root starting from `start`.
pub fn find_project_root_from(start: &Path) -> Result<PathBuf, ProjectRootError> {
    if let Ok(path) = env::var(PROJECT_ROOT_ENV)
        && !path.trim().is_empty()
    {
        let root = expand_tilde(&path);
        if root.join(MANIFEST_FILE).is_file() {
            debug!(root = %root.display(), "project root taken from environment");
            return Ok(root);
        }
        return Err(ProjectRootError::InvalidOverride { path });
    }

    start
        .ancestors()
        .find(|candidate| candidate.join(MANIFEST_FILE).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| ProjectRootError::NotFound {
            start: start.display().to_string(),
        })
}
