//! Project manifest (`manifest.json`) describing the project's runner language.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use stepwright_util::MANIFEST_FILE;

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Language whose runner owns the step implementations.
    pub language: String,
    #[serde(default)]
    pub plugins: Vec<String>,
}

/// Read the manifest from the project root.
pub fn load_manifest(project_root: &Path) -> Result<Manifest, ConfigError> {
    let path = project_root.join(MANIFEST_FILE);
    let content = fs::read_to_string(&path)?;
    let manifest: Manifest = serde_json::from_str(&content)?;
    if manifest.language.trim().is_empty() {
        return Err(ConfigError::Invalid {
            message: format!("{} does not name a language", path.display()),
        });
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_language_and_plugins() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(MANIFEST_FILE), r#"{"language":"rust","plugins":["html-report"]}"#).unwrap();
        let manifest = load_manifest(temp_dir.path()).expect("manifest");
        assert_eq!(manifest.language, "rust");
        assert_eq!(manifest.plugins, vec!["html-report".to_string()]);
    }

    #[test]
    fn blank_language_is_invalid() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(MANIFEST_FILE), r#"{"language":""}"#).unwrap();
        assert!(matches!(load_manifest(temp_dir.path()), Err(ConfigError::Invalid { .. })));
    }
}
