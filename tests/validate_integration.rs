mod common;

use common::{passing_doc, plint, write_doc};
use tempfile::tempdir;

#[test]
fn passing_library_exits_zero_with_summary() {
    let dir = tempdir().expect("create temp dir");
    write_doc(dir.path(), "guide.md", passing_doc());
    write_doc(dir.path(), "coding/review.md", passing_doc());

    let output = plint()
        .arg("validate")
        .arg("--library")
        .arg(dir.path())
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 documents: 2 passed, 0 failed, 0 load errors"));
    assert!(!stdout.contains("FAIL"));
}

#[test]
fn missing_required_fields_fail_with_exit_one() {
    let dir = tempdir().expect("create temp dir");
    write_doc(dir.path(), "broken.md", "# No Frontmatter\n\nBody only.\n");
    write_doc(dir.path(), "guide.md", passing_doc());

    let output = plint()
        .arg("validate")
        .arg("--library")
        .arg(dir.path())
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FAIL broken.md: missing title, type"));
    assert!(stdout.contains("2 documents: 1 passed, 1 failed, 0 load errors"));
}

#[test]
fn governance_documents_require_escalated_fields() {
    let dir = tempdir().expect("create temp dir");
    write_doc(
        dir.path(),
        "governance/retention.md",
        "---\ntitle: Data Retention Policy\ntype: reference\n---\n\nKeep records for seven years.\n",
    );

    let output = plint()
        .arg("validate")
        .arg("--library")
        .arg(dir.path())
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout
        .contains("FAIL governance/retention.md: missing governance_tags, dataClassification"));
}

#[test]
fn verbose_prints_warnings_and_variable_findings() {
    let dir = tempdir().expect("create temp dir");
    write_doc(
        dir.path(),
        "ask.md",
        "---\ntitle: Ask an Expert\ntype: conceptual\n---\n\nAnswer {{TOPIC}} questions.\n\n## Variables\n\n- `AUDIENCE`: who is asking\n",
    );

    let quiet = plint()
        .arg("validate")
        .arg("--library")
        .arg(dir.path())
        .output()
        .expect("run validate");
    assert_eq!(quiet.status.code(), Some(0));
    assert!(!String::from_utf8_lossy(&quiet.stdout).contains("WARN"));

    let verbose = plint()
        .arg("validate")
        .arg("--library")
        .arg(dir.path())
        .arg("-v")
        .output()
        .expect("run validate verbose");
    let stdout = String::from_utf8_lossy(&verbose.stdout);
    assert!(stdout.contains("WARN ask.md: missing_recommended"));
    assert!(stdout.contains("used but not declared: TOPIC"));
    assert!(stdout.contains("declared but never used: AUDIENCE"));
}

#[test]
fn folder_restricts_the_run() {
    let dir = tempdir().expect("create temp dir");
    write_doc(dir.path(), "coding/review.md", passing_doc());
    write_doc(dir.path(), "writing/blog.md", "# No Frontmatter\n");

    let output = plint()
        .arg("validate")
        .arg("--library")
        .arg(dir.path())
        .arg("--folder")
        .arg("coding")
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 documents: 1 passed, 0 failed, 0 load errors"));
}

#[test]
fn unreadable_documents_cause_exit_one() {
    let dir = tempdir().expect("create temp dir");
    write_doc(dir.path(), "guide.md", passing_doc());
    std::fs::write(dir.path().join("binary.md"), [0xff, 0xfe, 0x00, 0x41])
        .expect("write non-utf8 doc");

    let output = plint()
        .arg("validate")
        .arg("--library")
        .arg(dir.path())
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ERROR binary.md: read failed"));
    assert!(stdout.contains("1 passed, 0 failed, 1 load errors"));
}

#[test]
fn missing_library_root_is_catastrophic() {
    let dir = tempdir().expect("create temp dir");

    let output = plint()
        .arg("validate")
        .arg("--library")
        .arg(dir.path().join("absent"))
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn rules_stub_round_trips_through_validate() {
    let dir = tempdir().expect("create temp dir");
    let rules_path = dir.path().join("ruleset.json");

    let rules = plint()
        .arg("rules")
        .arg("--out")
        .arg(&rules_path)
        .output()
        .expect("run rules");
    assert_eq!(rules.status.code(), Some(0));

    let stub = std::fs::read_to_string(&rules_path).expect("read ruleset stub");
    let parsed: serde_json::Value = serde_json::from_str(&stub).expect("parse ruleset stub");
    assert_eq!(parsed["schema_version"], 1);
    assert_eq!(parsed["short_title_limit"], 27);

    let lib = dir.path().join("lib");
    write_doc(&lib, "guide.md", passing_doc());
    let validate = plint()
        .arg("validate")
        .arg("--library")
        .arg(&lib)
        .arg("--rules")
        .arg(&rules_path)
        .output()
        .expect("run validate");
    assert_eq!(validate.status.code(), Some(0));
}

#[test]
fn library_ruleset_overrides_builtin_defaults() {
    let dir = tempdir().expect("create temp dir");
    write_doc(dir.path(), "guide.md", passing_doc());
    std::fs::write(
        dir.path().join(".prompt-lint.json"),
        r#"{"schema_version": 1, "required_fields": ["title", "type", "owner"]}"#,
    )
    .expect("write library ruleset");

    let output = plint()
        .arg("validate")
        .arg("--library")
        .arg(dir.path())
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FAIL guide.md: missing owner"));
}
