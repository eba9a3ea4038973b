use std::fs;

use chrono::Local;

mod support;

use support::TestState;

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[test]
fn csv_export_writes_filtered_rows() {
    let state = TestState::new();
    let envelope = state.json(&["export", "csv", "--owner", "Design"]);
    assert_eq!(envelope["command"], "export csv");
    assert_eq!(envelope["data"]["rows"], 3);

    let path = state
        .path()
        .join(format!("brand-rebuild-v2.1-{}.csv", today()));
    let csv = fs::read_to_string(&path).expect("read csv");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "\"Task\",\"Start Date\",\"End Date\",\"Duration (days)\",\"Owner\",\"Progress (%)\""
    );
    assert_eq!(
        lines[1],
        "\"Logo design exploration\",\"2026-02-09\",\"2026-03-13\",\"32\",\"Design\",\"30\""
    );
}

#[test]
fn csv_export_respects_out_dir() {
    let state = TestState::new();
    let out = state.path().join("exports");
    state
        .cmd()
        .args(["export", "csv", "--out"])
        .arg(&out)
        .assert()
        .success();
    assert!(out
        .join(format!("brand-rebuild-v2.1-{}.csv", today()))
        .exists());
}

#[test]
fn pdf_export_writes_document() {
    let state = TestState::new();
    let envelope = state.json(&["export", "pdf"]);
    assert_eq!(envelope["data"]["rows"], 13);

    let path = state
        .path()
        .join(format!("brand-rebuild-v2.1-{}.pdf", today()));
    let bytes = fs::read(&path).expect("read pdf");
    assert!(bytes.starts_with(b"%PDF-1.4"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("Brand Rebuild v2.1"));
    assert!(text.contains("Completed: 1 / 13"));
}

#[test]
fn export_with_no_matches_still_writes_header() {
    let state = TestState::new();
    let envelope = state.json(&["export", "csv", "--search", "zzz"]);
    assert_eq!(envelope["data"]["rows"], 0);
    let path = state
        .path()
        .join(format!("brand-rebuild-v2.1-{}.csv", today()));
    let csv = fs::read_to_string(path).expect("read csv");
    assert_eq!(csv.lines().count(), 1);
}
