//! Workflow validate command.
//!
//! Failures stream as they arrive so large libraries give feedback before
//! the summary line.
use super::LintContext;
use crate::cli::ValidateArgs;
use crate::pipeline::{self, PipelineItem, PipelineOptions};
use crate::report::DocumentRecord;
use crate::score::HeuristicScorer;
use anyhow::Result;

/// Run required-field validation and print a per-library summary.
///
/// Exit code 1 means at least one document failed, could not be read, or
/// the run was interrupted.
pub fn run_validate(args: &ValidateArgs) -> Result<i32> {
    let ctx = LintContext::load(&args.library, args.rules.as_deref())?;
    let scorer = HeuristicScorer::default();

    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut load_errors = 0usize;
    let options = PipelineOptions {
        root: &ctx.root,
        folder: args.folder.as_deref(),
        jobs: args.jobs,
    };
    let outcome = pipeline::run(options, &ctx.ruleset, &scorer, |item| match item {
        PipelineItem::Document(record) => {
            report_document(&record, args.verbose);
            if record.validation.passed {
                passed += 1;
            } else {
                failed += 1;
            }
        }
        PipelineItem::LoadFailure(error) => {
            println!("ERROR {}: {}", error.path, error.message);
            load_errors += 1;
        }
    })?;

    if outcome.interrupted {
        eprintln!(
            "interrupted after {} of {} files",
            outcome.files_processed, outcome.files_total
        );
    }
    let total = passed + failed;
    println!("{total} documents: {passed} passed, {failed} failed, {load_errors} load errors");
    if failed > 0 || load_errors > 0 || outcome.interrupted {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn report_document(record: &DocumentRecord, verbose: bool) {
    let path = &record.document.rel_path;
    if !record.validation.passed {
        println!(
            "FAIL {path}: missing {}",
            record.validation.missing_required_fields.join(", ")
        );
    }
    if !verbose {
        return;
    }
    for warning in &record.validation.warnings {
        println!("WARN {path}: {}: {}", warning.code, warning.message);
    }
    for finding in &record.findings {
        println!("NOTE {path}: {}: {}", finding.code, finding.message);
    }
    if !record.variables.undeclared_used.is_empty() {
        println!(
            "VARS {path}: used but not declared: {}",
            record.variables.undeclared_used.join(", ")
        );
    }
    if !record.variables.unused_declared.is_empty() {
        println!(
            "VARS {path}: declared but never used: {}",
            record.variables.unused_declared.join(", ")
        );
    }
}
