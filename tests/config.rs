use std::fs;

use predicates::str::contains;
use rollout::config::Config;

mod support;

use support::{task_ids, TestState};

#[test]
fn load_or_default_on_invalid_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rollout.toml");
    fs::write(&path, "plan = 123").expect("write invalid config");

    let cfg = Config::load_or_default(&path);
    assert_eq!(cfg.plan.slug, "brand-rebuild");
    assert_eq!(cfg.tasks.default_owner, "Marketing");
}

#[test]
fn load_rejects_bad_slug() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rollout.toml");
    let content = r#"
[plan]
slug = "brand rebuild"
"#;
    fs::write(&path, content.trim()).expect("write config");

    assert!(Config::load(&path).is_err());
}

#[test]
fn config_in_state_dir_changes_defaults() {
    let state = TestState::new();
    state
        .write_state(
            "rollout.toml",
            r#"
[plan]
name = "Spring Refresh"
slug = "spring"

[tasks]
default_owner = "Ops"

[progress]
seed_sample = false
"#,
        )
        .expect("write config");

    let created = state.json(&["new", "Kickoff call"]);
    assert_eq!(created["data"]["owner"], "Ops");

    let shown = state.json(&["show", "brand-audit"]);
    assert_eq!(shown["data"]["percent"], 0);

    let exported = state.json(&["export", "csv"]);
    let path = exported["data"]["path"].as_str().expect("path");
    assert!(path.contains("spring-v2.1-"));
}

#[test]
fn explicit_invalid_config_is_an_error() {
    let state = TestState::new();
    let path = state
        .write_file("bad.toml", "[tasks]\ndefault_owner = \"  \"\n")
        .expect("write config");
    state
        .cmd()
        .arg("--config")
        .arg(&path)
        .arg("list")
        .assert()
        .code(2)
        .stderr(contains("default_owner"));
}

#[test]
fn configured_catalog_replaces_builtin() {
    let state = TestState::new();
    state
        .write_state(
            "plan.json",
            r#"{
  "version": "1.0",
  "tasks": [
    {"id": "kickoff", "label": "Kickoff", "start": "2026-02-01", "end": "2026-02-05", "owner": "Ops"},
    {"id": "ship", "label": "Ship it", "start": "2026-02-06", "end": "2026-02-20", "owner": "Ops"}
  ],
  "subtasks": {
    "ship": [
      {"id": "build", "label": "Build", "weight": 0.5},
      {"id": "deploy", "label": "Deploy", "weight": 0.5}
    ]
  }
}"#,
        )
        .expect("write catalog");
    state
        .write_state(
            "rollout.toml",
            "[plan]\ncatalog = \"plan.json\"\nkickoff = \"2026-02-01\"\n",
        )
        .expect("write config");

    let listed = state.json(&["list"]);
    assert_eq!(task_ids(&listed), vec!["kickoff", "ship"]);
    assert_eq!(listed["data"]["tasks"][0]["status"], "overdue");

    let checked = state.json(&["check", "ship", "build"]);
    assert_eq!(checked["data"]["percent"], 50);
}

#[test]
fn catalog_with_bad_weights_exits_with_catalog_code() {
    let state = TestState::new();
    state
        .write_state(
            "plan.json",
            r#"{
  "version": "1.0",
  "tasks": [
    {"id": "ship", "label": "Ship it", "start": "2026-02-06", "end": "2026-02-20", "owner": "Ops"}
  ],
  "subtasks": {
    "ship": [
      {"id": "build", "label": "Build", "weight": 0.5},
      {"id": "deploy", "label": "Deploy", "weight": 0.4}
    ]
  }
}"#,
        )
        .expect("write catalog");
    state
        .write_state("rollout.toml", "[plan]\ncatalog = \"plan.json\"\n")
        .expect("write config");

    state
        .cmd()
        .arg("list")
        .assert()
        .code(3)
        .stderr(contains("Invalid catalog"));
}
