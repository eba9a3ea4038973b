#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Reference date used by every CLI test unless overridden
pub const TEST_DATE: &str = "2026-02-10";

pub struct TestState {
    dir: TempDir,
}

impl TestState {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.state_dir().join(name)
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_state(&self, name: &str, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file(&format!("state/{name}"), contents)
    }

    pub fn read_state(&self, name: &str) -> Value {
        let contents = fs::read_to_string(self.file(name)).expect("read state file");
        serde_json::from_str(&contents).expect("parse state file")
    }

    /// `rollout` pinned to this state dir and TEST_DATE, run from the tempdir
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("rollout").expect("binary");
        cmd.current_dir(self.dir.path())
            .env("ROLLOUT_STATE_DIR", self.state_dir())
            .env("ROLLOUT_DATE", TEST_DATE)
            .env_remove("ROLLOUT_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run with `--json` and return the parsed envelope
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run rollout");
        assert!(
            output.status.success(),
            "rollout {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("parse json envelope")
    }
}

pub fn task_ids(envelope: &Value) -> Vec<String> {
    envelope["data"]["tasks"]
        .as_array()
        .expect("tasks array")
        .iter()
        .map(|task| task["id"].as_str().expect("task id").to_string())
        .collect()
}
