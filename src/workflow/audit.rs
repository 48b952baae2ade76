//! Workflow audit command.
use super::{build_scorer, collect_audit, LintContext};
use crate::cli::AuditArgs;
use crate::report::render_csv;
use anyhow::{Context, Result};
use std::fs;

/// Emit the machine-readable audit: CSV to stdout or `--output`, plus an
/// optional full JSON dump.
pub fn run_audit(args: &AuditArgs) -> Result<i32> {
    let ctx = LintContext::load(&args.library, args.rules.as_deref())?;
    let scorer = build_scorer(None);
    let report = collect_audit(&ctx, args.jobs, scorer.as_ref())?;

    let csv = render_csv(&report);
    match &args.output {
        Some(path) => {
            fs::write(path, csv).with_context(|| format!("write {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{csv}"),
    }
    if let Some(path) = &args.out_json {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, format!("{json}\n"))
            .with_context(|| format!("write {}", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(0)
}
