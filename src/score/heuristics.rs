//! Offline signal-driven criterion scorer.
//!
//! Each criterion starts from a base once any signal fires and adds fixed
//! points per signal. A criterion with no signal at all resolves to the
//! neutral default and is flagged low-confidence.
use crate::corpus::PromptDocument;
use crate::score::{CriterionAssessment, CriterionScorer, ScorerOutput, NEUTRAL_SCORE};
use crate::variables::VariableReport;
use anyhow::Result;
use regex::Regex;
use std::collections::BTreeMap;

/// Score floor applied once a criterion has at least one signal.
const BASE_SCORE: u16 = 40;

const REASONING_MARKERS: &[&str] = &[
    "step by step",
    "step-by-step",
    "chain of thought",
    "chain-of-thought",
    "think through",
];

/// Deterministic scorer built on textual signals. Stateless.
#[derive(Debug, Default)]
pub struct HeuristicScorer;

impl CriterionScorer for HeuristicScorer {
    fn id(&self) -> &'static str {
        "heuristic"
    }

    fn assess(
        &self,
        document: &PromptDocument,
        variables: &VariableReport,
        rubric: &BTreeMap<String, f64>,
    ) -> Result<ScorerOutput> {
        let mut output = ScorerOutput::default();
        for criterion in rubric.keys() {
            let contributions = match criterion.as_str() {
                "clarity" => clarity_signals(document),
                "specificity" => specificity_signals(document),
                "completeness" => completeness_signals(document, variables),
                "effectiveness" => effectiveness_signals(document),
                _ => Vec::new(),
            };
            output
                .criteria
                .insert(criterion.clone(), assessment_from(contributions));
        }
        Ok(output)
    }
}

fn assessment_from(contributions: Vec<(u16, String)>) -> CriterionAssessment {
    if contributions.is_empty() {
        return CriterionAssessment {
            score: NEUTRAL_SCORE,
            signals: Vec::new(),
            low_confidence: true,
        };
    }
    let mut score = BASE_SCORE;
    let mut signals = Vec::new();
    for (points, signal) in contributions {
        score += points;
        signals.push(signal);
    }
    CriterionAssessment {
        score: score.min(100) as u8,
        signals,
        low_confidence: false,
    }
}

fn clarity_signals(document: &PromptDocument) -> Vec<(u16, String)> {
    let mut found = Vec::new();
    if has_role_statement(&document.body) {
        found.push((25, "role statement present".to_string()));
    }
    if has_heading(&document.body, &["output", "format"]) {
        found.push((25, "output format section present".to_string()));
    }
    if document.field_present("title") {
        found.push((10, "frontmatter title present".to_string()));
    }
    found
}

fn specificity_signals(document: &PromptDocument) -> Vec<(u16, String)> {
    let mut found = Vec::new();
    if let Some(section) = heading_section(&document.body, &["example"]) {
        if is_populated(&section) {
            found.push((30, "example section is populated".to_string()));
        }
    }
    if has_concrete_numbers(&document.body) {
        found.push((15, "concrete quantities mentioned".to_string()));
    }
    found
}

fn completeness_signals(
    document: &PromptDocument,
    variables: &VariableReport,
) -> Vec<(u16, String)> {
    let mut found = Vec::new();
    if has_heading(&document.body, &["edge"]) {
        found.push((20, "edge case section present".to_string()));
    }
    if has_heading(&document.body, &["constraint", "governance", "escalation"]) {
        found.push((20, "constraints or governance section present".to_string()));
    }
    if !variables.declared.is_empty() && variables.descriptions.len() == variables.declared.len() {
        found.push((20, "declared variables all carry descriptions".to_string()));
    }
    found
}

fn effectiveness_signals(document: &PromptDocument) -> Vec<(u16, String)> {
    let mut found = Vec::new();
    let lower = document.body.to_lowercase();
    if let Some(marker) = REASONING_MARKERS.iter().find(|m| lower.contains(*m)) {
        found.push((20, format!("reasoning technique mentioned ({marker:?})")));
    }
    if has_few_shot_examples(&document.body) {
        found.push((15, "few-shot examples present".to_string()));
    }
    if let Some(contribution) = effectiveness_score_signal(document) {
        found.push(contribution);
    }
    found
}

/// Translate a frontmatter `effectivenessScore` into up to 25 points.
/// Values at or below 10 are read on a 0-10 scale, larger ones on 0-100.
fn effectiveness_score_signal(document: &PromptDocument) -> Option<(u16, String)> {
    let value = document.field("effectivenessScore")?;
    let raw = value.as_f64()?;
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    let normalized = if raw <= 10.0 { raw / 10.0 } else { raw / 100.0 };
    let points = (normalized.clamp(0.0, 1.0) * 25.0).round() as u16;
    Some((points, format!("frontmatter effectivenessScore {raw}")))
}

fn has_role_statement(body: &str) -> bool {
    let pattern = Regex::new(r"(?i)\b(you are|act as)\b").expect("regex for role statements");
    pattern.is_match(body) || has_heading(body, &["role"])
}

fn has_concrete_numbers(body: &str) -> bool {
    // Percentages, decimals, or multi-digit numbers; plain list markers
    // like "1." do not count.
    let pattern = Regex::new(r"\d+%|\d+\.\d+|\b\d{2,}\b").expect("regex for concrete numbers");
    pattern.is_match(body)
}

fn has_few_shot_examples(body: &str) -> bool {
    let numbered = Regex::new(r"(?i)\bexample\s*\d").expect("regex for numbered examples");
    if numbered.find_iter(body).count() >= 2 {
        return true;
    }
    let input = Regex::new(r"(?im)^\s*(\*\*)?input(\*\*)?\s*:").expect("regex for input markers");
    let output =
        Regex::new(r"(?im)^\s*(\*\*)?output(\*\*)?\s*:").expect("regex for output markers");
    input.is_match(body) && output.is_match(body)
}

fn has_heading(body: &str, keywords: &[&str]) -> bool {
    body.lines().any(|line| {
        let trimmed = line.trim_start();
        trimmed.starts_with('#') && {
            let text = trimmed.trim_start_matches('#').trim().to_lowercase();
            keywords.iter().any(|keyword| text.contains(keyword))
        }
    })
}

/// Text of the first section whose heading contains one of the keywords,
/// up to the next heading.
fn heading_section(body: &str, keywords: &[&str]) -> Option<String> {
    let mut section = String::new();
    let mut in_section = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            if in_section {
                break;
            }
            let text = trimmed.trim_start_matches('#').trim().to_lowercase();
            if keywords.iter().any(|keyword| text.contains(keyword)) {
                in_section = true;
            }
            continue;
        }
        if in_section {
            section.push_str(line);
            section.push('\n');
        }
    }
    if in_section {
        Some(section)
    } else {
        None
    }
}

/// A section counts as populated when enough text remains after removing
/// placeholder tokens.
fn is_populated(section: &str) -> bool {
    let double = Regex::new(r"\{\{[^{}]*\}\}").expect("regex for double-brace tokens");
    let single = Regex::new(r"\[[^\[\]]*\]").expect("regex for bracket tokens");
    let without_double = double.replace_all(section, "");
    let stripped = single.replace_all(&without_double, "");
    stripped.chars().filter(|c| c.is_alphanumeric()).count() >= 30
}

#[cfg(test)]
#[path = "heuristics_tests.rs"]
mod tests;
