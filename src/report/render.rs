//! Markdown and CSV renderers for the audit.
use crate::report::{AuditReport, DocumentRow};
use crate::score::Tier;

/// Render the human-readable evaluation report.
pub fn render_markdown(report: &AuditReport) -> String {
    let audit = &report.audit;
    let mut out = String::new();

    out.push_str("# Prompt Library Evaluation Report\n\n");
    out.push_str(&format!("- Library: `{}`\n", audit.library_root));
    out.push_str(&format!(
        "- Generated (epoch ms): {}\n",
        audit.generated_at_epoch_ms
    ));
    out.push_str(&format!(
        "- Documents: {} ({} passed, {} failed)\n",
        audit.total_documents, audit.pass_count, audit.fail_count
    ));
    out.push_str(&format!("- Pass rate: {}\n", pass_rate(audit.pass_count, audit.total_documents)));
    out.push_str(&format!(
        "- Overall score: {:.1} ({})\n",
        audit.overall_average_score, audit.overall_tier
    ));
    if audit.partial {
        out.push_str(
            "\n> Partial report: the run was interrupted before every file was processed.\n",
        );
    }

    out.push_str("\n## Category Breakdown\n\n");
    if audit.category_breakdown.is_empty() {
        out.push_str("No documents found.\n");
    } else {
        out.push_str("| Category | Documents | Average Score | Tier |\n");
        out.push_str("| --- | --- | --- | --- |\n");
        for (category, summary) in &audit.category_breakdown {
            out.push_str(&format!(
                "| {} | {} | {:.1} | {} |\n",
                category, summary.count, summary.average_score, summary.tier
            ));
        }
    }

    out.push_str("\n## Flagged Documents\n\n");
    let flagged: Vec<&DocumentRow> = report
        .documents
        .iter()
        .filter(|row| !row.passed || row.tier == Tier::BelowTier3)
        .collect();
    if flagged.is_empty() {
        out.push_str("None.\n");
    } else {
        for row in flagged {
            out.push_str(&format!("- `{}` {}\n", row.path, flag_reason(row)));
        }
    }

    out.push_str("\n## Load Errors\n\n");
    if audit.load_errors.is_empty() {
        out.push_str("None.\n");
    } else {
        for error in &audit.load_errors {
            out.push_str(&format!("- `{}`: {}\n", error.path, error.message));
        }
    }

    out.push_str("\n## Rubric\n\n");
    out.push_str("| Criterion | Weight |\n");
    out.push_str("| --- | --- |\n");
    for (criterion, weight) in &audit.rubric {
        out.push_str(&format!("| {criterion} | {weight} |\n"));
    }

    out
}

fn pass_rate(pass_count: usize, total: usize) -> String {
    if total == 0 {
        return "n/a".to_string();
    }
    format!("{}% ({pass_count}/{total})", pass_count * 100 / total)
}

fn flag_reason(row: &DocumentRow) -> String {
    let mut reasons = Vec::new();
    if !row.passed {
        reasons.push(format!(
            "failed validation (missing {})",
            row.missing_required_fields.join(", ")
        ));
    }
    if row.tier == Tier::BelowTier3 {
        reasons.push(format!("scored {:.1} (Below Tier 3)", row.weighted_score));
    }
    reasons.join("; ")
}

/// Render the per-document CSV. Load errors appear as rows with an empty
/// score and `passed=error`.
pub fn render_csv(report: &AuditReport) -> String {
    let mut out = String::from("path,type,difficulty,score,tier,passed\n");
    for row in &report.documents {
        out.push_str(&format!(
            "{},{},{},{:.1},{},{}\n",
            csv_field(&row.path),
            csv_field(row.doc_type.as_deref().unwrap_or("")),
            csv_field(row.difficulty.as_deref().unwrap_or("")),
            row.weighted_score,
            row.tier.as_str(),
            row.passed
        ));
    }
    for error in &report.audit.load_errors {
        out.push_str(&format!("{},,,,,error\n", csv_field(&error.path)));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_fields_quote_commas_and_quotes() {
        assert_eq!(csv_field("plain.md"), "plain.md");
        assert_eq!(csv_field("a,b.md"), "\"a,b.md\"");
        assert_eq!(csv_field("say \"hi\".md"), "\"say \"\"hi\"\".md\"");
    }

    #[test]
    fn pass_rate_handles_empty_corpus() {
        assert_eq!(pass_rate(0, 0), "n/a");
        assert_eq!(pass_rate(3, 4), "75% (3/4)");
    }
}
