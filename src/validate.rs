//! Frontmatter schema validation against the active ruleset.
//!
//! Only missing required fields fail a document. Everything else the
//! validator notices is a coded warning.
use crate::corpus::{PromptDocument, Warning};
use crate::rules::CompiledRuleSet;
use serde::{Deserialize, Serialize};

/// Outcome of schema validation for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub document_path: String,
    /// Ordered as the ruleset lists the fields.
    pub missing_required_fields: Vec<String>,
    pub warnings: Vec<Warning>,
    /// Always equal to `missing_required_fields.is_empty()`.
    pub passed: bool,
}

/// Validate one document's frontmatter.
///
/// Loader warnings (malformed YAML and friends) are carried into the
/// result so every parse problem surfaces in one place. Documents under a
/// sensitive path get the ruleset's governance fields promoted from
/// recommended to required.
pub fn validate_document(
    document: &PromptDocument,
    ruleset: &CompiledRuleSet,
) -> ValidationResult {
    let rules = ruleset.rules();
    let mut warnings = document.warnings.clone();

    let mut required: Vec<&str> = rules.required_fields.iter().map(String::as_str).collect();
    if ruleset.is_sensitive_path(&document.rel_path) {
        for field in &rules.sensitive_required_fields {
            if !required.contains(&field.as_str()) {
                required.push(field);
            }
        }
    }

    let missing_required_fields: Vec<String> = required
        .iter()
        .filter(|field| !document.field_present(field))
        .map(|field| field.to_string())
        .collect();

    for field in &rules.recommended_fields {
        if required.contains(&field.as_str()) {
            continue;
        }
        if !document.field_present(field) {
            warnings.push(Warning::new(
                "missing_recommended",
                format!("recommended field {field:?} is absent"),
            ));
        }
    }

    if let Some(doc_type) = document.field_str("type") {
        if !rules.known_types.iter().any(|known| known == doc_type) {
            warnings.push(Warning::new(
                "unknown_type",
                format!("type {doc_type:?} is not a known content type"),
            ));
        }
    }
    if let Some(difficulty) = document.field_str("difficulty") {
        if !rules
            .known_difficulties
            .iter()
            .any(|known| known == difficulty)
        {
            warnings.push(Warning::new(
                "unknown_difficulty",
                format!("difficulty {difficulty:?} is not a known level"),
            ));
        }
    }
    if let Some(short_title) = document.field_str("shortTitle") {
        let length = short_title.chars().count();
        if length > rules.short_title_limit {
            warnings.push(Warning::new(
                "short_title_overflow",
                format!(
                    "shortTitle is {length} characters (limit {})",
                    rules.short_title_limit
                ),
            ));
        }
    }
    if document.field_present("governance_tags")
        && !is_string_array(document.field("governance_tags"))
    {
        warnings.push(Warning::new(
            "governance_tags_not_strings",
            "governance_tags must be an array of strings",
        ));
    }

    let passed = missing_required_fields.is_empty();
    ValidationResult {
        document_path: document.rel_path.clone(),
        missing_required_fields,
        warnings,
        passed,
    }
}

fn is_string_array(value: Option<&serde_yaml::Value>) -> bool {
    match value {
        Some(serde_yaml::Value::Sequence(entries)) => {
            entries.iter().all(|entry| entry.as_str().is_some())
        }
        _ => false,
    }
}
