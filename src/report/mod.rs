//! Audit aggregation and report artifacts.
//!
//! [`AuditBuilder`] consumes per-document records and load errors one at a
//! time, in any order, and finalizes into the audit artifact. All derived
//! numbers are computed at finalize from path-keyed maps, so the result is
//! independent of processing order.
pub mod render;

pub use render::{render_csv, render_markdown};

use crate::classify::Finding;
use crate::corpus::{LoadError, PromptDocument, Warning};
use crate::rules::RuleSet;
use crate::score::{tier_for, ScoreResult, Tier};
use crate::util;
use crate::validate::ValidationResult;
use crate::variables::VariableReport;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Current schema version for the JSON audit artifact.
pub const AUDIT_SCHEMA_VERSION: u32 = 1;

/// Everything the pipeline computed for one document.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub document: PromptDocument,
    pub validation: ValidationResult,
    pub findings: Vec<Finding>,
    pub variables: VariableReport,
    pub score: ScoreResult,
}

/// Flat per-document row for the JSON audit and CSV. The document body is
/// deliberately not carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRow {
    pub path: String,
    pub category: String,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub difficulty: Option<String>,
    pub passed: bool,
    pub missing_required_fields: Vec<String>,
    pub warnings: Vec<Warning>,
    pub findings: Vec<Finding>,
    pub undeclared_used: Vec<String>,
    pub unused_declared: Vec<String>,
    pub criterion_scores: BTreeMap<String, u8>,
    pub weighted_score: f64,
    pub tier: Tier,
    pub low_confidence: Vec<String>,
    pub signals: BTreeMap<String, Vec<String>>,
    pub notes: Vec<String>,
}

impl DocumentRow {
    pub fn from_record(record: &DocumentRecord) -> Self {
        DocumentRow {
            path: record.document.rel_path.clone(),
            category: record.document.category.clone(),
            doc_type: record.document.field_str("type").map(str::to_string),
            difficulty: record.document.field_str("difficulty").map(str::to_string),
            passed: record.validation.passed,
            missing_required_fields: record.validation.missing_required_fields.clone(),
            warnings: record.validation.warnings.clone(),
            findings: record.findings.clone(),
            undeclared_used: record.variables.undeclared_used.clone(),
            unused_declared: record.variables.unused_declared.clone(),
            criterion_scores: record.score.criterion_scores.clone(),
            weighted_score: record.score.weighted_score,
            tier: record.score.tier,
            low_confidence: record.score.low_confidence.clone(),
            signals: record.score.signals.clone(),
            notes: record.score.notes.clone(),
        }
    }
}

/// Aggregate numbers for one top-level category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub count: usize,
    pub average_score: f64,
    pub tier: Tier,
}

/// Repository-level audit summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryAudit {
    pub schema_version: u32,
    pub generated_at_epoch_ms: u128,
    pub library_root: String,
    pub total_documents: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub overall_average_score: f64,
    pub overall_tier: Tier,
    pub category_breakdown: BTreeMap<String, CategorySummary>,
    pub load_errors: Vec<LoadError>,
    /// True when the run was interrupted before every file was processed.
    pub partial: bool,
    pub rubric: BTreeMap<String, f64>,
}

/// The audit plus its path-sorted per-document rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub audit: RepositoryAudit,
    pub documents: Vec<DocumentRow>,
}

/// Streaming, order-independent audit accumulator.
#[derive(Debug)]
pub struct AuditBuilder {
    library_root: String,
    rubric: BTreeMap<String, f64>,
    rows: BTreeMap<String, DocumentRow>,
    load_errors: Vec<LoadError>,
    partial: bool,
}

impl AuditBuilder {
    pub fn new(library_root: &Path, rubric: BTreeMap<String, f64>) -> Self {
        AuditBuilder {
            library_root: util::display_path(library_root, None),
            rubric,
            rows: BTreeMap::new(),
            load_errors: Vec::new(),
            partial: false,
        }
    }

    /// Fold one scored document into the audit.
    pub fn absorb_record(&mut self, record: &DocumentRecord) {
        let row = DocumentRow::from_record(record);
        self.rows.insert(row.path.clone(), row);
    }

    /// Fold one unreadable file into the audit.
    pub fn absorb_load_error(&mut self, error: LoadError) {
        self.load_errors.push(error);
    }

    /// Record that the run stopped before covering every file.
    pub fn mark_partial(&mut self) {
        self.partial = true;
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn document_count(&self) -> usize {
        self.rows.len()
    }

    /// Compute the audit. Tier floors come from the ruleset.
    pub fn finalize(self, rules: &RuleSet) -> Result<AuditReport> {
        let documents: Vec<DocumentRow> = self.rows.into_values().collect();
        let mut load_errors = self.load_errors;
        load_errors.sort_by(|a, b| a.path.cmp(&b.path));

        let total_documents = documents.len();
        let pass_count = documents.iter().filter(|row| row.passed).count();
        let fail_count = total_documents - pass_count;
        let overall_average_score = average_score(documents.iter());

        let mut category_breakdown = BTreeMap::new();
        let mut grouped: BTreeMap<&str, Vec<&DocumentRow>> = BTreeMap::new();
        for row in &documents {
            grouped.entry(row.category.as_str()).or_default().push(row);
        }
        for (category, rows) in grouped {
            let average = average_score(rows.iter().copied());
            category_breakdown.insert(
                category.to_string(),
                CategorySummary {
                    count: rows.len(),
                    average_score: average,
                    tier: tier_for(average, rules),
                },
            );
        }

        let audit = RepositoryAudit {
            schema_version: AUDIT_SCHEMA_VERSION,
            generated_at_epoch_ms: util::now_epoch_ms()?,
            library_root: self.library_root,
            total_documents,
            pass_count,
            fail_count,
            overall_average_score,
            overall_tier: tier_for(overall_average_score, rules),
            category_breakdown,
            load_errors,
            partial: self.partial,
            rubric: self.rubric,
        };
        Ok(AuditReport { audit, documents })
    }
}

fn average_score<'a>(rows: impl Iterator<Item = &'a DocumentRow>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for row in rows {
        sum += row.weighted_score;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        util::round1(sum / count as f64)
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
