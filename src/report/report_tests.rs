use super::*;
use crate::rules::default_ruleset;
use crate::score::Tier;
use std::path::PathBuf;

fn record(rel_path: &str, score: f64, passed: bool) -> DocumentRecord {
    let rules = default_ruleset();
    let category = match rel_path.split_once('/') {
        Some((first, _)) => first.to_string(),
        None => ".".to_string(),
    };
    let document = PromptDocument {
        abs_path: PathBuf::from(rel_path),
        rel_path: rel_path.to_string(),
        category,
        frontmatter: BTreeMap::new(),
        body: String::new(),
        warnings: Vec::new(),
    };
    let missing = if passed {
        Vec::new()
    } else {
        vec!["title".to_string()]
    };
    DocumentRecord {
        validation: ValidationResult {
            document_path: rel_path.to_string(),
            missing_required_fields: missing,
            warnings: Vec::new(),
            passed,
        },
        findings: Vec::new(),
        variables: VariableReport::default(),
        score: ScoreResult {
            criterion_scores: BTreeMap::new(),
            weights: rules.rubric.clone(),
            weighted_score: score,
            tier: tier_for(score, &rules),
            signals: BTreeMap::new(),
            low_confidence: Vec::new(),
            notes: Vec::new(),
            scorer: "fixed".to_string(),
        },
        document,
    }
}

fn build(records: &[DocumentRecord], errors: &[LoadError]) -> AuditReport {
    let rules = default_ruleset();
    let mut builder = AuditBuilder::new(Path::new("/library"), rules.rubric.clone());
    for record in records {
        builder.absorb_record(record);
    }
    for error in errors {
        builder.absorb_load_error(error.clone());
    }
    builder.finalize(&rules).expect("finalize audit")
}

#[test]
fn aggregation_is_order_independent() {
    let records = vec![
        record("coding/a.md", 90.0, true),
        record("coding/b.md", 80.0, true),
        record("writing/c.md", 40.0, false),
    ];
    let errors = vec![
        LoadError {
            path: "zz.md".to_string(),
            message: "read failed".to_string(),
        },
        LoadError {
            path: "aa.md".to_string(),
            message: "read failed".to_string(),
        },
    ];

    let forward = build(&records, &errors);
    let mut reversed_records = records.clone();
    reversed_records.reverse();
    let mut reversed_errors = errors.clone();
    reversed_errors.reverse();
    let backward = build(&reversed_records, &reversed_errors);

    assert_eq!(forward.audit.total_documents, backward.audit.total_documents);
    assert_eq!(forward.audit.pass_count, backward.audit.pass_count);
    assert_eq!(
        forward.audit.overall_average_score,
        backward.audit.overall_average_score
    );
    let forward_paths: Vec<&str> = forward.documents.iter().map(|r| r.path.as_str()).collect();
    let backward_paths: Vec<&str> = backward.documents.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(forward_paths, backward_paths);
    assert_eq!(forward.audit.load_errors, backward.audit.load_errors);
    assert_eq!(
        serde_json::to_value(&forward.audit.category_breakdown).expect("serialize"),
        serde_json::to_value(&backward.audit.category_breakdown).expect("serialize")
    );
}

#[test]
fn category_breakdown_groups_by_top_level_folder() {
    let report = build(
        &[
            record("coding/a.md", 90.0, true),
            record("coding/b.md", 80.0, true),
            record("README.md", 40.0, true),
        ],
        &[],
    );
    let coding = report
        .audit
        .category_breakdown
        .get("coding")
        .expect("coding category");
    assert_eq!(coding.count, 2);
    assert!((coding.average_score - 85.0).abs() < f64::EPSILON);
    assert_eq!(coding.tier, Tier::Tier1);

    let root = report
        .audit
        .category_breakdown
        .get(".")
        .expect("root category");
    assert_eq!(root.count, 1);
    assert_eq!(root.tier, Tier::BelowTier3);
}

#[test]
fn counts_and_load_errors_are_tallied() {
    let report = build(
        &[
            record("a.md", 90.0, true),
            record("b.md", 60.0, false),
        ],
        &[LoadError {
            path: "broken.md".to_string(),
            message: "read failed: permission denied".to_string(),
        }],
    );
    assert_eq!(report.audit.total_documents, 2);
    assert_eq!(report.audit.pass_count, 1);
    assert_eq!(report.audit.fail_count, 1);
    assert_eq!(report.audit.load_errors.len(), 1);
    assert!((report.audit.overall_average_score - 75.0).abs() < f64::EPSILON);
    assert_eq!(report.audit.overall_tier, Tier::Tier2);
}

#[test]
fn empty_library_finalizes_to_degenerate_report() {
    let report = build(&[], &[]);
    assert_eq!(report.audit.total_documents, 0);
    assert!((report.audit.overall_average_score - 0.0).abs() < f64::EPSILON);
    assert_eq!(report.audit.overall_tier, Tier::BelowTier3);
    assert!(report.audit.category_breakdown.is_empty());
    assert!(!report.audit.partial);

    let markdown = render_markdown(&report);
    assert!(markdown.contains("No documents found."));
    let csv = render_csv(&report);
    assert_eq!(csv, "path,type,difficulty,score,tier,passed\n");
}

#[test]
fn markdown_report_flags_failures_and_low_tiers() {
    let rules = default_ruleset();
    let mut builder = AuditBuilder::new(Path::new("/library"), rules.rubric.clone());
    builder.absorb_record(&record("good.md", 90.0, true));
    builder.absorb_record(&record("failing.md", 75.0, false));
    builder.absorb_record(&record("weak.md", 30.0, true));
    builder.mark_partial();
    let report = builder.finalize(&rules).expect("finalize");

    let markdown = render_markdown(&report);
    assert!(markdown.contains("`failing.md` failed validation (missing title)"));
    assert!(markdown.contains("`weak.md` scored 30.0 (Below Tier 3)"));
    assert!(!markdown.contains("`good.md` failed"));
    assert!(markdown.contains("Partial report"));
    assert!(markdown.contains("| clarity | 0.25 |"));
}

#[test]
fn csv_lists_documents_then_error_rows() {
    let report = build(
        &[record("coding/a.md", 85.5, true)],
        &[LoadError {
            path: "broken.md".to_string(),
            message: "read failed".to_string(),
        }],
    );
    let csv = render_csv(&report);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "path,type,difficulty,score,tier,passed");
    assert_eq!(lines[1], "coding/a.md,,,85.5,tier1,true");
    assert_eq!(lines[2], "broken.md,,,,,error");
}

#[test]
fn audit_serializes_with_schema_version() {
    let report = build(&[record("a.md", 70.0, true)], &[]);
    let json = serde_json::to_string_pretty(&report).expect("serialize report");
    assert!(json.contains("\"schema_version\": 1"));
    assert!(json.contains("\"tier\": \"tier2\""));
    let parsed: AuditReport = serde_json::from_str(&json).expect("round trip");
    assert_eq!(parsed.documents.len(), 1);
}
