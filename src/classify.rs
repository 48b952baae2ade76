//! Content-type classifier.
//!
//! Cross-checks the declared `type` against title prefix conventions.
//! Findings are advisory and never block a document.
use crate::corpus::PromptDocument;
use serde::{Deserialize, Serialize};

/// Advisory finding from the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub code: String,
    pub message: String,
}

/// Content types with a title prefix convention. Types not listed here
/// carry no convention and produce no findings.
const TITLE_PREFIXES: &[(&str, &str)] = &[
    ("troubleshooting", "troubleshooting"),
    ("quickstart", "quickstart"),
    ("tutorial", "tutorial"),
    ("how_to", "how to"),
];

/// Check a document's title against its declared type.
pub fn classify_document(document: &PromptDocument) -> Vec<Finding> {
    let (Some(title), Some(doc_type)) = (document.field_str("title"), document.field_str("type"))
    else {
        return Vec::new();
    };
    let Some((_, expected)) = TITLE_PREFIXES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(doc_type))
    else {
        return Vec::new();
    };
    if title.to_lowercase().starts_with(expected) {
        return Vec::new();
    }
    vec![Finding {
        code: "title_prefix_mismatch".to_string(),
        message: format!(
            "type {doc_type:?} titles usually start with {expected:?} (title is {title:?})"
        ),
    }]
}
