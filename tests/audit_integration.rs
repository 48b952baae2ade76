mod common;

use common::{passing_doc, plint, write_doc};
use tempfile::tempdir;

#[test]
fn audit_prints_csv_to_stdout() {
    let dir = tempdir().expect("create temp dir");
    write_doc(dir.path(), "coding/review.md", passing_doc());
    write_doc(dir.path(), "notes.md", "# No Frontmatter\n");

    let output = plint()
        .arg("audit")
        .arg("--library")
        .arg(dir.path())
        .output()
        .expect("run audit");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("path,type,difficulty,score,tier,passed"));
    let first = lines.next().expect("first data row");
    assert!(first.starts_with("coding/review.md,troubleshooting,intermediate,"));
    assert!(first.ends_with(",true"));
    let second = lines.next().expect("second data row");
    assert!(second.starts_with("notes.md,,,"));
    assert!(second.ends_with(",false"));
}

#[test]
fn audit_writes_csv_and_json_files() {
    let dir = tempdir().expect("create temp dir");
    let lib = dir.path().join("lib");
    write_doc(&lib, "guide.md", passing_doc());
    let csv_path = dir.path().join("audit.csv");
    let json_path = dir.path().join("audit.json");

    let output = plint()
        .arg("audit")
        .arg("--library")
        .arg(&lib)
        .arg("--output")
        .arg(&csv_path)
        .arg("--out-json")
        .arg(&json_path)
        .output()
        .expect("run audit");

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());

    let csv = std::fs::read_to_string(&csv_path).expect("read csv");
    assert!(csv.starts_with("path,type,difficulty,score,tier,passed\n"));
    assert!(csv.contains("guide.md,troubleshooting,intermediate,"));

    let json = std::fs::read_to_string(&json_path).expect("read json");
    let report: serde_json::Value = serde_json::from_str(&json).expect("parse audit json");
    assert_eq!(report["audit"]["schema_version"], 1);
    assert_eq!(report["audit"]["pass_count"], 1);
    assert_eq!(report["documents"][0]["path"], "guide.md");
}

#[test]
fn unreadable_documents_become_error_rows() {
    let dir = tempdir().expect("create temp dir");
    write_doc(dir.path(), "guide.md", passing_doc());
    std::fs::write(dir.path().join("binary.md"), [0xff, 0xfe, 0x00, 0x41])
        .expect("write non-utf8 doc");

    let output = plint()
        .arg("audit")
        .arg("--library")
        .arg(dir.path())
        .output()
        .expect("run audit");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("binary.md,,,,,error"));
}

#[test]
fn audit_runs_are_deterministic() {
    let dir = tempdir().expect("create temp dir");
    write_doc(dir.path(), "coding/review.md", passing_doc());
    write_doc(dir.path(), "writing/blog.md", "# No Frontmatter\n");
    write_doc(dir.path(), "guide.md", passing_doc());

    let first = plint()
        .arg("audit")
        .arg("--library")
        .arg(dir.path())
        .output()
        .expect("run audit");
    let second = plint()
        .arg("audit")
        .arg("--library")
        .arg(dir.path())
        .output()
        .expect("run audit again");

    assert_eq!(first.status.code(), Some(0));
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn empty_library_still_produces_a_report() {
    let dir = tempdir().expect("create temp dir");

    let output = plint()
        .arg("audit")
        .arg("--library")
        .arg(dir.path())
        .output()
        .expect("run audit");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end(), "path,type,difficulty,score,tier,passed");
}
