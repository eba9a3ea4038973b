use predicates::str::contains;

mod support;

use support::TestState;

#[test]
fn colors_list_shows_defaults() {
    let state = TestState::new();
    let envelope = state.json(&["colors", "list"]);
    assert_eq!(envelope["command"], "colors list");
    assert_eq!(envelope["data"]["colors"]["launch"], "#10b981");
    assert_eq!(envelope["data"]["colors"].as_object().expect("colors").len(), 5);
}

#[test]
fn colors_set_normalizes_and_persists() {
    let state = TestState::new();
    let envelope = state.json(&["colors", "set", "Identity", "#AABBCC"]);
    assert_eq!(envelope["data"]["colors"]["identity"], "#aabbcc");

    let stored = state.read_state("categoryColors.json");
    assert_eq!(stored["identity"], "#aabbcc");
    assert_eq!(stored["strategy"], "#6366f1");

    let envelope = state.json(&["colors", "reset"]);
    assert_eq!(envelope["data"]["colors"]["identity"], "#ec4899");
}

#[test]
fn colors_set_rejects_bad_input() {
    let state = TestState::new();
    state
        .cmd()
        .args(["colors", "set", "launch", "green"])
        .assert()
        .code(2)
        .stderr(contains("expected #rrggbb"));

    state
        .cmd()
        .args(["colors", "set", "mascot", "#ffffff"])
        .assert()
        .code(2);
}

#[test]
fn json_errors_use_the_envelope() {
    let state = TestState::new();
    let output = state
        .cmd()
        .args(["--json", "colors", "set", "launch", "green"])
        .output()
        .expect("run rollout");
    assert_eq!(output.status.code(), Some(2));

    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["command"], "colors set");
    assert_eq!(envelope["error"]["kind"], "user_error");
    assert_eq!(envelope["error"]["code"], 2);
}
