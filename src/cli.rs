//! CLI argument parsing for the prompt-lint workflow.
//!
//! The CLI is intentionally thin: it wires arguments to workflow runs without
//! embedding validation or scoring policy, so the core logic stays reusable.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for prompt library linting.
///
/// A single `RootArgs` type keeps command routing in one place instead of
/// spreading defaults across subcommand constructors.
#[derive(Parser, Debug)]
#[command(
    name = "plint",
    version,
    about = "Frontmatter validation and quality scoring for Markdown prompt libraries",
    after_help = "Commands:\n  validate --library <dir>  Check frontmatter and content rules\n  evaluate --library <dir>  Score documents and write a Markdown report\n  audit --library <dir>     Emit a CSV (and optional JSON) quality audit\n  rules                     Print or write the built-in default ruleset\n\nExamples:\n  plint validate --library ./prompts -v\n  plint validate --library ./prompts --folder coding\n  plint evaluate --library ./prompts --lm \"llm -m mistral\"\n  plint audit --library ./prompts --output audit.csv --out-json audit.json\n  plint rules --out .prompt-lint.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level lint commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Validate(ValidateArgs),
    Evaluate(EvaluateArgs),
    Audit(AuditArgs),
    Rules(RulesArgs),
}

/// Validate command inputs for required-field and content checks.
#[derive(Parser, Debug)]
#[command(about = "Validate frontmatter and content rules across a library")]
pub struct ValidateArgs {
    /// Prompt library root containing Markdown documents
    #[arg(long, value_name = "DIR")]
    pub library: PathBuf,

    /// Restrict the run to one subdirectory of the library
    #[arg(long, value_name = "REL")]
    pub folder: Option<String>,

    /// Ruleset file overriding the resolution chain
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Worker thread count (defaults to available parallelism, capped at 8)
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Emit per-document warnings and variable findings
    #[arg(short, long)]
    pub verbose: bool,
}

/// Evaluate command inputs for corpus scoring.
#[derive(Parser, Debug)]
#[command(about = "Score documents and write a Markdown evaluation report")]
pub struct EvaluateArgs {
    /// Prompt library root containing Markdown documents
    #[arg(long, value_name = "DIR")]
    pub library: PathBuf,

    /// Ruleset file overriding the resolution chain
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Report destination (defaults to docs/reports/EVALUATION_REPORT.md)
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Shell command for language-model scoring (falls back to heuristics)
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,

    /// Worker thread count (defaults to available parallelism, capped at 8)
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Print the audit as JSON instead of the score summary
    #[arg(long)]
    pub json: bool,
}

/// Audit command inputs for machine-readable exports.
#[derive(Parser, Debug)]
#[command(about = "Emit a CSV (and optional JSON) audit of the library")]
pub struct AuditArgs {
    /// Prompt library root containing Markdown documents
    #[arg(long, value_name = "DIR")]
    pub library: PathBuf,

    /// Ruleset file overriding the resolution chain
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// CSV destination (stdout when omitted)
    #[arg(long, value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Full audit JSON destination
    #[arg(long, value_name = "FILE")]
    pub out_json: Option<PathBuf>,

    /// Worker thread count (defaults to available parallelism, capped at 8)
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,
}

/// Rules command inputs for the built-in ruleset stub.
#[derive(Parser, Debug)]
#[command(about = "Print or write the built-in default ruleset")]
pub struct RulesArgs {
    /// Ruleset destination (stdout when omitted)
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}
