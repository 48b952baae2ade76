//! Prompt library corpus: document discovery and frontmatter parsing.
pub mod frontmatter;
pub mod loader;

pub use loader::{discover_documents, ensure_library_root, load_document, DiscoveredCorpus};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Non-fatal issue attached to a document by the loader or a checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
}

impl Warning {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Warning {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// A file the run could not read. Carried into the audit as data; a load
/// error never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadError {
    /// Library-relative `/`-separated path.
    pub path: String,
    pub message: String,
}

/// One Markdown document from the library with its parsed frontmatter.
#[derive(Debug, Clone)]
pub struct PromptDocument {
    pub abs_path: PathBuf,
    /// Library-relative `/`-separated path; the document's stable id.
    pub rel_path: String,
    /// Top-level folder under the library root; `.` for root-level files.
    pub category: String,
    /// Open mapping: unknown keys are tolerated and preserved.
    pub frontmatter: BTreeMap<String, serde_yaml::Value>,
    /// Markdown text after the frontmatter block.
    pub body: String,
    /// Parse-level warnings recorded by the loader.
    pub warnings: Vec<Warning>,
}

impl PromptDocument {
    pub fn field(&self, name: &str) -> Option<&serde_yaml::Value> {
        self.frontmatter.get(name)
    }

    /// A field counts as present only when it is set to a non-null value
    /// and, for strings, is not empty after trimming.
    pub fn field_present(&self, name: &str) -> bool {
        match self.frontmatter.get(name) {
            None | Some(serde_yaml::Value::Null) => false,
            Some(serde_yaml::Value::String(text)) => !text.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// The field's string value, if it is present and a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        match self.frontmatter.get(name) {
            Some(serde_yaml::Value::String(text)) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }
}
