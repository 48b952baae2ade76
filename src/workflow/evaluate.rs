//! Workflow evaluate command.
use super::{build_scorer, collect_audit, LintContext};
use crate::cli::EvaluateArgs;
use crate::report::render_markdown;
use anyhow::{Context, Result};
use std::fs;

/// Report location under the library root when `--out` is not given.
const DEFAULT_REPORT_REL: &str = "docs/reports/EVALUATION_REPORT.md";

/// Score the whole corpus and write the Markdown evaluation report.
pub fn run_evaluate(args: &EvaluateArgs) -> Result<i32> {
    let ctx = LintContext::load(&args.library, args.rules.as_deref())?;
    let scorer = build_scorer(args.lm.as_deref());
    let report = collect_audit(&ctx, args.jobs, scorer.as_ref())?;

    let report_path = args
        .out
        .clone()
        .unwrap_or_else(|| ctx.root.join(DEFAULT_REPORT_REL));
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&report_path, render_markdown(&report))
        .with_context(|| format!("write {}", report_path.display()))?;
    eprintln!("wrote {}", report_path.display());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(0);
    }
    let audit = &report.audit;
    println!(
        "{} documents: overall score {:.1} ({})",
        audit.total_documents, audit.overall_average_score, audit.overall_tier
    );
    if audit.partial {
        println!("partial results: the run was interrupted");
    }
    Ok(0)
}
