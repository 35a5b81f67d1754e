//! Domain models for submodule requests, collection requests, and collected files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A remote repository to register as a submodule at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmoduleRequest {
    pub url: String,
    pub path: PathBuf,
}

impl SubmoduleRequest {
    pub fn new(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
        }
    }
}

/// Everything needed for a single collect-and-render run.
///
/// Relative paths are resolved against the project root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionRequest {
    #[serde(default)]
    pub directories: Vec<PathBuf>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default, alias = "ignores")]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default, alias = "template")]
    pub template_path: PathBuf,
    #[serde(default, alias = "vars")]
    pub template_vars: BTreeMap<String, serde_json::Value>,
    #[serde(default, alias = "output")]
    pub output_path: PathBuf,
}

/// A file read during collection, ready to be substituted into a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectedFile {
    pub path: PathBuf,
    pub display_path: String,
    pub language: Option<String>,
    pub contents: String,
    pub lines: usize,
}
