//! Rubric-weighted document scoring.
//!
//! Criterion scorers sit behind [`CriterionScorer`] so the weighting
//! arithmetic stays pure and exactly testable. The offline default is
//! [`HeuristicScorer`]; [`LmScorer`] delegates to an external command.
pub mod heuristics;
pub mod lm;

pub use heuristics::HeuristicScorer;
pub use lm::LmScorer;

use crate::corpus::PromptDocument;
use crate::rules::RuleSet;
use crate::util;
use crate::variables::VariableReport;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Score used when no signal supports a criterion.
pub const NEUTRAL_SCORE: u8 = 50;

/// Quality tier derived from the weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
    BelowTier3,
}

impl Tier {
    /// Stable identifier used in CSV and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Tier1 => "tier1",
            Tier::Tier2 => "tier2",
            Tier::Tier3 => "tier3",
            Tier::BelowTier3 => "below_tier3",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Tier1 => "Tier 1",
            Tier::Tier2 => "Tier 2",
            Tier::Tier3 => "Tier 3",
            Tier::BelowTier3 => "Below Tier 3",
        };
        f.write_str(name)
    }
}

/// Map a rounded weighted score onto the ruleset's tier floors.
pub fn tier_for(score: f64, rules: &RuleSet) -> Tier {
    if score >= rules.tier1_floor {
        Tier::Tier1
    } else if score >= rules.tier2_floor {
        Tier::Tier2
    } else if score >= rules.tier3_floor {
        Tier::Tier3
    } else {
        Tier::BelowTier3
    }
}

/// One criterion's assessment from a scorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionAssessment {
    /// 0-100; values above 100 are clamped by the caller.
    pub score: u8,
    /// Human-readable contributing signals.
    pub signals: Vec<String>,
    /// True when the scorer had nothing to go on.
    pub low_confidence: bool,
}

/// Everything a scorer produced for one document.
#[derive(Debug, Clone, Default)]
pub struct ScorerOutput {
    pub criteria: BTreeMap<String, CriterionAssessment>,
    /// Run-level notes (fallbacks and similar), surfaced in reports.
    pub notes: Vec<String>,
}

/// Strategy interface for criterion scoring.
pub trait CriterionScorer: Sync {
    /// Stable identifier recorded in score results.
    fn id(&self) -> &'static str;

    /// Assess every rubric criterion for one document.
    fn assess(
        &self,
        document: &PromptDocument,
        variables: &VariableReport,
        rubric: &BTreeMap<String, f64>,
    ) -> Result<ScorerOutput>;
}

/// Scored result with explainability data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub criterion_scores: BTreeMap<String, u8>,
    pub weights: BTreeMap<String, f64>,
    /// 0-100, rounded to one decimal.
    pub weighted_score: f64,
    pub tier: Tier,
    /// Per-criterion contributing signals.
    pub signals: BTreeMap<String, Vec<String>>,
    /// Criteria that resolved to the neutral default.
    pub low_confidence: Vec<String>,
    /// Scorer fallbacks and other run-level notes.
    pub notes: Vec<String>,
    pub scorer: String,
}

/// Combine per-criterion scores into the weighted 0-100 score.
///
/// Criteria absent from `scores` contribute the neutral default so a
/// partial map still weights to a full-range score.
pub fn weighted_score(scores: &BTreeMap<String, u8>, weights: &BTreeMap<String, f64>) -> f64 {
    let total: f64 = weights
        .iter()
        .map(|(criterion, weight)| {
            let score = scores.get(criterion).copied().unwrap_or(NEUTRAL_SCORE);
            f64::from(score) * weight
        })
        .sum();
    util::round1(total)
}

/// Score one document with the given scorer.
///
/// Criteria the scorer skipped fall back to the neutral default and are
/// flagged low-confidence. A scorer error degrades to all-neutral with a
/// note; it never aborts the run.
pub fn score_document(
    scorer: &dyn CriterionScorer,
    document: &PromptDocument,
    variables: &VariableReport,
    rules: &RuleSet,
) -> ScoreResult {
    let output = match scorer.assess(document, variables, &rules.rubric) {
        Ok(output) => output,
        Err(err) => {
            tracing::warn!(
                document = %document.rel_path,
                error = %err,
                "scorer failed; substituting neutral scores"
            );
            ScorerOutput {
                criteria: BTreeMap::new(),
                notes: vec![format!(
                    "scorer {} failed ({err:#}); neutral scores substituted",
                    scorer.id()
                )],
            }
        }
    };

    let mut criterion_scores = BTreeMap::new();
    let mut signals = BTreeMap::new();
    let mut low_confidence = Vec::new();
    for criterion in rules.rubric.keys() {
        match output.criteria.get(criterion) {
            Some(assessment) => {
                criterion_scores.insert(criterion.clone(), assessment.score.min(100));
                signals.insert(criterion.clone(), assessment.signals.clone());
                if assessment.low_confidence {
                    low_confidence.push(criterion.clone());
                }
            }
            None => {
                criterion_scores.insert(criterion.clone(), NEUTRAL_SCORE);
                signals.insert(criterion.clone(), Vec::new());
                low_confidence.push(criterion.clone());
            }
        }
    }

    let weighted = weighted_score(&criterion_scores, &rules.rubric);
    ScoreResult {
        criterion_scores,
        weights: rules.rubric.clone(),
        weighted_score: weighted,
        tier: tier_for(weighted, rules),
        signals,
        low_confidence,
        notes: output.notes,
        scorer: scorer.id().to_string(),
    }
}
