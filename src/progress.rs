//! Subtask completion store.
//!
//! Maps task id to subtask id to a done flag. Persisted verbatim as
//! `subtaskProgress.json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Completion flags seeded on first run when `progress.seed_sample` is on.
const SAMPLE_COMPLETION: &[(&str, &[&str])] = &[
    ("brand-audit", &["inventory", "interviews", "competitors", "survey", "readout"]),
    ("positioning", &["pillars", "voice"]),
    ("naming-review", &["shortlist"]),
    ("logo-design", &["concepts"]),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ProgressStore {
    completion: BTreeMap<String, BTreeMap<String, bool>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample() -> Self {
        let mut store = Self::new();
        for (task_id, subtasks) in SAMPLE_COMPLETION {
            for subtask_id in *subtasks {
                store.set(task_id, subtask_id, true);
            }
        }
        store
    }

    pub fn is_done(&self, task_id: &str, subtask_id: &str) -> bool {
        self.completion
            .get(task_id)
            .and_then(|flags| flags.get(subtask_id))
            .copied()
            .unwrap_or(false)
    }

    pub fn flags(&self, task_id: &str) -> Option<&BTreeMap<String, bool>> {
        self.completion.get(task_id)
    }

    pub fn set(&mut self, task_id: &str, subtask_id: &str, done: bool) {
        self.completion
            .entry(task_id.to_string())
            .or_default()
            .insert(subtask_id.to_string(), done);
    }

    /// Flip a flag and return its new value
    pub fn toggle(&mut self, task_id: &str, subtask_id: &str) -> bool {
        let done = !self.is_done(task_id, subtask_id);
        self.set(task_id, subtask_id, done);
        done
    }

    pub fn remove_task(&mut self, task_id: &str) -> bool {
        self.completion.remove(task_id).is_some()
    }

    pub fn clear(&mut self) {
        self.completion.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.completion.is_empty()
    }
}
