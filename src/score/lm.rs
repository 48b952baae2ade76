//! LM-backed criterion scorer.
//!
//! Invokes a user-configured command with a rubric prompt on stdin and
//! parses a JSON object of criterion scores from stdout. The command can
//! be any tool that reads text and writes text (`llm`, `ollama run`,
//! custom scripts). On any failure the scorer falls back to the heuristic
//! scorer for that document and records a note.
use crate::corpus::PromptDocument;
use crate::score::{CriterionAssessment, CriterionScorer, HeuristicScorer, ScorerOutput};
use crate::variables::VariableReport;
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Instant;

/// Env var consulted when `--lm` is not given.
pub const LM_COMMAND_ENV: &str = "PLINT_LM_COMMAND";

/// Retries after a malformed response, with the parse error included in
/// the retry prompt.
const MAX_LM_RETRIES: usize = 1;

/// Body text beyond this many bytes is truncated in the prompt.
const MAX_PROMPT_BODY_BYTES: usize = 12_000;

const RUBRIC_PROMPT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/prompts/score_rubric.md"
));

/// Resolve the LM command from the CLI flag or the environment.
pub fn resolve_lm_command(flag: Option<&str>) -> Option<String> {
    if let Some(command) = flag {
        return Some(command.to_string());
    }
    std::env::var(LM_COMMAND_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Scorer that delegates criterion judgment to an external command.
#[derive(Debug)]
pub struct LmScorer {
    command: String,
    fallback: HeuristicScorer,
}

impl LmScorer {
    pub fn new(command: String) -> Self {
        LmScorer {
            command,
            fallback: HeuristicScorer,
        }
    }

    fn assess_with_lm(
        &self,
        document: &PromptDocument,
        rubric: &BTreeMap<String, f64>,
    ) -> Result<ScorerOutput> {
        let mut last_error: Option<String> = None;
        let mut last_response: Option<String> = None;

        for attempt in 0..=MAX_LM_RETRIES {
            let prompt = if attempt == 0 {
                build_rubric_prompt(document, rubric)?
            } else {
                tracing::debug!(attempt, document = %document.rel_path, "retrying lm scoring");
                build_retry_prompt(
                    rubric,
                    last_error.as_deref().unwrap_or("unknown error"),
                    last_response.as_deref(),
                )
            };
            // Command execution errors are config problems; no retry.
            let response = invoke_lm_command(&self.command, &prompt)?;
            match parse_scores(&response, rubric) {
                Ok(scores) => {
                    let mut output = ScorerOutput::default();
                    for (criterion, score) in scores {
                        output.criteria.insert(
                            criterion,
                            CriterionAssessment {
                                score,
                                signals: Vec::new(),
                                low_confidence: false,
                            },
                        );
                    }
                    return Ok(output);
                }
                Err(err) => {
                    last_error = Some(err.to_string());
                    last_response = Some(response);
                }
            }
        }

        Err(anyhow!(
            "LM scoring failed after {} attempts. Last error: {}",
            MAX_LM_RETRIES + 1,
            last_error.unwrap_or_else(|| "unknown".to_string())
        ))
    }
}

impl CriterionScorer for LmScorer {
    fn id(&self) -> &'static str {
        "lm"
    }

    fn assess(
        &self,
        document: &PromptDocument,
        variables: &VariableReport,
        rubric: &BTreeMap<String, f64>,
    ) -> Result<ScorerOutput> {
        match self.assess_with_lm(document, rubric) {
            Ok(output) => Ok(output),
            Err(err) => {
                tracing::warn!(
                    document = %document.rel_path,
                    error = %err,
                    "lm scoring failed; falling back to heuristics"
                );
                let mut output = self.fallback.assess(document, variables, rubric)?;
                output.notes.push(format!(
                    "lm scorer failed ({err:#}); heuristic scores substituted"
                ));
                Ok(output)
            }
        }
    }
}

fn build_rubric_prompt(
    document: &PromptDocument,
    rubric: &BTreeMap<String, f64>,
) -> Result<String> {
    let frontmatter = serde_json::to_string_pretty(&document.frontmatter)
        .context("serialize frontmatter for LM prompt")?;
    let body = snippet(&document.body, MAX_PROMPT_BODY_BYTES);
    let body = if body.len() < document.body.len() {
        format!("{body}\n...(truncated)")
    } else {
        body.to_string()
    };
    let criteria = rubric
        .iter()
        .map(|(name, weight)| format!("- `{name}` (weight {weight})"))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(RUBRIC_PROMPT
        .replace("{document_path}", &document.rel_path)
        .replace("{frontmatter}", &frontmatter)
        .replace("{body}", &body)
        .replace("{criteria}", &criteria)
        .replace("{example}", &example_response(rubric)))
}

fn build_retry_prompt(
    rubric: &BTreeMap<String, f64>,
    error: &str,
    previous_response: Option<&str>,
) -> String {
    let mut prompt = format!(
        "You are scoring one Markdown prompt template against a quality rubric.\n\n\
## Previous Response Error\n\n\
Your previous response could not be used. Fix the error and respond again.\n\n\
**Error:** {error}\n\n"
    );
    if let Some(response) = previous_response {
        let cut = snippet(response, 1000);
        let suffix = if cut.len() < response.len() {
            "...(truncated)"
        } else {
            ""
        };
        prompt.push_str(&format!(
            "**Your previous response:**\n```\n{cut}{suffix}\n```\n\n"
        ));
    }
    prompt.push_str(&format!(
        "## Response Format Reminder\n\n\
Respond ONLY with a JSON object mapping every criterion name to an \
integer score from 0 to 100, no other text:\n\n```json\n{}\n```\n",
        example_response(rubric)
    ));
    prompt
}

fn example_response(rubric: &BTreeMap<String, f64>) -> String {
    let entries = rubric
        .keys()
        .map(|name| format!("  \"{name}\": 75"))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{{\n{entries}\n}}")
}

/// Invoke the LM command with the prompt on stdin.
fn invoke_lm_command(command: &str, prompt: &str) -> Result<String> {
    let args =
        shell_words::split(command).with_context(|| format!("parse LM command: {command}"))?;
    if args.is_empty() {
        return Err(anyhow!("LM command is empty"));
    }

    let start = Instant::now();
    let mut child = Command::new(&args[0])
        .args(&args[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawn LM command: {}", args[0]))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(prompt.as_bytes())
            .context("write prompt to LM stdin")?;
    }

    let output = child.wait_with_output().context("wait for LM command")?;
    let elapsed_ms = start.elapsed().as_millis();
    tracing::info!(
        elapsed_ms,
        prompt_bytes = prompt.len(),
        response_bytes = output.stdout.len(),
        "lm invoke complete"
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "LM command failed with status {}: {}",
            output.status,
            stderr.trim()
        ));
    }

    String::from_utf8(output.stdout).context("decode LM stdout as UTF-8")
}

/// Parse the response into a full per-criterion score map.
fn parse_scores(text: &str, rubric: &BTreeMap<String, f64>) -> Result<BTreeMap<String, u8>> {
    let json_text = extract_json(text);
    let values: BTreeMap<String, serde_json::Value> = serde_json::from_str(json_text)
        .with_context(|| format!("parse LM scores as JSON object: {}", snippet(text, 500)))?;

    let mut scores = BTreeMap::new();
    for criterion in rubric.keys() {
        let value = values
            .get(criterion)
            .ok_or_else(|| anyhow!("LM response is missing criterion {criterion:?}"))?;
        let number = value
            .as_f64()
            .ok_or_else(|| anyhow!("LM score for {criterion:?} is not a number"))?;
        if !(0.0..=100.0).contains(&number) {
            return Err(anyhow!(
                "LM score for {criterion:?} is out of range: {number}"
            ));
        }
        scores.insert(criterion.clone(), number.round() as u8);
    }
    Ok(scores)
}

/// Extract JSON from text that might carry markdown code fences.
fn extract_json(text: &str) -> &str {
    let text = text.trim();
    if let Some(start) = text.find("```json") {
        let start = start + 7;
        if let Some(end) = text[start..].find("```") {
            return text[start..start + end].trim();
        }
    }
    if let Some(start) = text.find("```") {
        let start = start + 3;
        let start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[start..].find("```") {
            return text[start..start + end].trim();
        }
    }
    text
}

/// Truncate to at most `limit` bytes without splitting a character.
fn snippet(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
