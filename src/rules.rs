//! Ruleset configuration for validation and scoring.
//!
//! Field sets, enums, limits, sensitive-path patterns, rubric weights, and
//! tier floors are all data here, not struct types, so a library can adjust
//! policy without code changes.
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Current schema version for ruleset JSON files.
pub const RULESET_SCHEMA_VERSION: u32 = 1;

/// Library-owned ruleset override, relative to the library root.
pub const LIBRARY_RULESET_REL: &str = ".prompt-lint.json";

/// Tolerance when checking that rubric weights sum to 1.0.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Declarative validation and scoring policy.
///
/// Every field has a default so a partial override file only states what it
/// changes; unknown keys are rejected to catch typos.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    pub schema_version: u32,
    /// Fields whose absence fails a document, in reporting order.
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<String>,
    /// Fields whose absence is only warned about.
    #[serde(default = "default_recommended_fields")]
    pub recommended_fields: Vec<String>,
    /// Accepted values for the `type` field; others warn.
    #[serde(default = "default_known_types")]
    pub known_types: Vec<String>,
    /// Accepted values for the `difficulty` field; others warn.
    #[serde(default = "default_known_difficulties")]
    pub known_difficulties: Vec<String>,
    /// Maximum `shortTitle` length in characters.
    #[serde(default = "default_short_title_limit")]
    pub short_title_limit: usize,
    /// Regex patterns matched against library-relative paths; a match
    /// escalates `sensitive_required_fields` from recommended to required.
    #[serde(default = "default_sensitive_path_patterns")]
    pub sensitive_path_patterns: Vec<String>,
    /// Fields required on documents under sensitive paths.
    #[serde(default = "default_sensitive_required_fields")]
    pub sensitive_required_fields: Vec<String>,
    /// Criterion name to weight fraction; weights must sum to 1.0.
    #[serde(default = "default_rubric")]
    pub rubric: BTreeMap<String, f64>,
    /// Weighted-score floor for Tier 1.
    #[serde(default = "default_tier1_floor")]
    pub tier1_floor: f64,
    /// Weighted-score floor for Tier 2.
    #[serde(default = "default_tier2_floor")]
    pub tier2_floor: f64,
    /// Weighted-score floor for Tier 3.
    #[serde(default = "default_tier3_floor")]
    pub tier3_floor: f64,
}

fn default_required_fields() -> Vec<String> {
    vec!["title".to_string(), "type".to_string()]
}

fn default_recommended_fields() -> Vec<String> {
    [
        "shortTitle",
        "intro",
        "difficulty",
        "audience",
        "platforms",
        "topics",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}

fn default_known_types() -> Vec<String> {
    [
        "conceptual",
        "quickstart",
        "how_to",
        "tutorial",
        "reference",
        "troubleshooting",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}

fn default_known_difficulties() -> Vec<String> {
    ["beginner", "intermediate", "advanced"]
        .iter()
        .map(|name| name.to_string())
        .collect()
}

fn default_short_title_limit() -> usize {
    27
}

fn default_sensitive_path_patterns() -> Vec<String> {
    vec!["governance".to_string(), "business".to_string()]
}

fn default_sensitive_required_fields() -> Vec<String> {
    vec!["governance_tags".to_string(), "dataClassification".to_string()]
}

fn default_rubric() -> BTreeMap<String, f64> {
    let mut rubric = BTreeMap::new();
    rubric.insert("clarity".to_string(), 0.25);
    rubric.insert("effectiveness".to_string(), 0.30);
    rubric.insert("specificity".to_string(), 0.20);
    rubric.insert("completeness".to_string(), 0.25);
    rubric
}

fn default_tier1_floor() -> f64 {
    85.0
}

fn default_tier2_floor() -> f64 {
    70.0
}

fn default_tier3_floor() -> f64 {
    55.0
}

/// Build the built-in default ruleset.
pub fn default_ruleset() -> RuleSet {
    RuleSet {
        schema_version: RULESET_SCHEMA_VERSION,
        required_fields: default_required_fields(),
        recommended_fields: default_recommended_fields(),
        known_types: default_known_types(),
        known_difficulties: default_known_difficulties(),
        short_title_limit: default_short_title_limit(),
        sensitive_path_patterns: default_sensitive_path_patterns(),
        sensitive_required_fields: default_sensitive_required_fields(),
        rubric: default_rubric(),
        tier1_floor: default_tier1_floor(),
        tier2_floor: default_tier2_floor(),
        tier3_floor: default_tier3_floor(),
    }
}

/// Render a pretty JSON ruleset stub for customization.
pub fn ruleset_stub() -> String {
    let ruleset = default_ruleset();
    serde_json::to_string_pretty(&ruleset).expect("serialize ruleset stub")
}

/// Load a ruleset from a JSON file.
pub fn load_ruleset(path: &Path) -> Result<RuleSet> {
    let bytes = fs::read(path).with_context(|| format!("read ruleset {}", path.display()))?;
    let ruleset: RuleSet = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse ruleset JSON {}", path.display()))?;
    Ok(ruleset)
}

/// Validate ruleset schema and internal consistency.
pub fn validate_ruleset(ruleset: &RuleSet) -> Result<()> {
    if ruleset.schema_version != RULESET_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported ruleset schema_version {}",
            ruleset.schema_version
        ));
    }
    if ruleset.rubric.is_empty() {
        return Err(anyhow!("rubric must define at least one criterion"));
    }
    for (criterion, weight) in &ruleset.rubric {
        if !weight.is_finite() || *weight <= 0.0 {
            return Err(anyhow!(
                "rubric weight for {criterion:?} must be a positive number (got {weight})"
            ));
        }
    }
    let weight_sum: f64 = ruleset.rubric.values().sum();
    if (weight_sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
        return Err(anyhow!(
            "rubric weights must sum to 1.0 (got {weight_sum})"
        ));
    }
    if ruleset.short_title_limit == 0 {
        return Err(anyhow!("short_title_limit must be at least 1"));
    }
    if !(ruleset.tier1_floor > ruleset.tier2_floor
        && ruleset.tier2_floor > ruleset.tier3_floor
        && ruleset.tier3_floor >= 0.0)
    {
        return Err(anyhow!(
            "tier floors must be descending and non-negative (got {}, {}, {})",
            ruleset.tier1_floor,
            ruleset.tier2_floor,
            ruleset.tier3_floor
        ));
    }
    for pattern in &ruleset.sensitive_path_patterns {
        Regex::new(pattern)
            .with_context(|| format!("compile sensitive path pattern {pattern:?}"))?;
    }
    Ok(())
}

/// Where a resolved ruleset came from, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesetSource {
    Flag,
    Library,
    User,
    Builtin,
}

impl RulesetSource {
    /// Return the stable string identifier used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RulesetSource::Flag => "flag",
            RulesetSource::Library => "library",
            RulesetSource::User => "user",
            RulesetSource::Builtin => "builtin",
        }
    }
}

impl fmt::Display for RulesetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the active ruleset: `--rules` flag, then the library-owned
/// `.prompt-lint.json`, then the user config dir, then built-in defaults.
pub fn resolve_ruleset(
    explicit: Option<&Path>,
    library_root: &Path,
) -> Result<(RuleSet, RulesetSource)> {
    if let Some(path) = explicit {
        return Ok((load_ruleset(path)?, RulesetSource::Flag));
    }
    let library_candidate = library_root.join(LIBRARY_RULESET_REL);
    if library_candidate.is_file() {
        return Ok((load_ruleset(&library_candidate)?, RulesetSource::Library));
    }
    if let Some(config_dir) = dirs::config_dir() {
        let user_candidate = config_dir.join("prompt-lint").join("ruleset.json");
        if user_candidate.is_file() {
            return Ok((load_ruleset(&user_candidate)?, RulesetSource::User));
        }
    }
    Ok((default_ruleset(), RulesetSource::Builtin))
}

/// A validated ruleset with its sensitive-path patterns pre-compiled.
#[derive(Debug)]
pub struct CompiledRuleSet {
    rules: RuleSet,
    sensitive: Vec<Regex>,
}

impl CompiledRuleSet {
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Whether a library-relative path falls under the escalated
    /// governance policy.
    pub fn is_sensitive_path(&self, path: &str) -> bool {
        self.sensitive.iter().any(|pattern| pattern.is_match(path))
    }
}

impl RuleSet {
    /// Validate and compile this ruleset for use by the pipeline.
    pub fn compile(self) -> Result<CompiledRuleSet> {
        validate_ruleset(&self)?;
        let sensitive = self
            .sensitive_path_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .with_context(|| format!("compile sensitive path pattern {pattern:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CompiledRuleSet {
            rules: self,
            sensitive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ruleset_validates() {
        validate_ruleset(&default_ruleset()).expect("default ruleset is valid");
    }

    #[test]
    fn default_rubric_weights_sum_to_one() {
        let ruleset = default_ruleset();
        let sum: f64 = ruleset.rubric.values().sum();
        assert!((sum - 1.0).abs() < WEIGHT_SUM_EPSILON);
    }

    #[test]
    fn stub_round_trips() {
        let stub = ruleset_stub();
        let parsed: RuleSet = serde_json::from_str(&stub).expect("parse stub");
        validate_ruleset(&parsed).expect("stub is valid");
        assert_eq!(parsed.short_title_limit, 27);
        assert_eq!(parsed.required_fields, vec!["title", "type"]);
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let parsed: RuleSet =
            serde_json::from_str(r#"{"schema_version": 1, "short_title_limit": 40}"#)
                .expect("parse partial ruleset");
        assert_eq!(parsed.short_title_limit, 40);
        assert_eq!(parsed.required_fields, vec!["title", "type"]);
        assert_eq!(parsed.rubric.len(), 4);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: std::result::Result<RuleSet, _> =
            serde_json::from_str(r#"{"schema_version": 1, "requird_fields": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn bad_weight_sum_is_rejected() {
        let mut ruleset = default_ruleset();
        ruleset.rubric.insert("extra".to_string(), 0.5);
        assert!(validate_ruleset(&ruleset).is_err());
    }

    #[test]
    fn bad_schema_version_is_rejected() {
        let mut ruleset = default_ruleset();
        ruleset.schema_version = 99;
        assert!(validate_ruleset(&ruleset).is_err());
    }

    #[test]
    fn bad_sensitive_pattern_is_rejected() {
        let mut ruleset = default_ruleset();
        ruleset.sensitive_path_patterns = vec!["[".to_string()];
        assert!(validate_ruleset(&ruleset).is_err());
    }

    #[test]
    fn sensitive_paths_match_after_compile() {
        let compiled = default_ruleset().compile().expect("compile default ruleset");
        assert!(compiled.is_sensitive_path("prompts/governance/x.md"));
        assert!(compiled.is_sensitive_path("business/briefing.md"));
        assert!(!compiled.is_sensitive_path("prompts/reasoning/cot.md"));
    }
}
