//! Override store: user edits layered over the catalog.
//!
//! Holds per-task field overrides, the set of deleted task ids, and tasks the
//! user created by hand. Persisted as `overrides.json` in the state dir.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::TaskDefinition;

pub const OVERRIDES_SCHEMA_VERSION: &str = "rollout.overrides.v1";

/// Partial replacement for a task's editable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TaskOverride {
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
            && self.end.is_none()
            && non_empty(&self.owner).is_none()
            && non_empty(&self.label).is_none()
    }

    /// Fold a newer partial edit into this one. Blank strings in `patch` are ignored.
    pub fn merge(&mut self, patch: TaskOverride) {
        if patch.start.is_some() {
            self.start = patch.start;
        }
        if patch.end.is_some() {
            self.end = patch.end;
        }
        if let Some(owner) = non_empty(&patch.owner) {
            self.owner = Some(owner.to_string());
        }
        if let Some(label) = non_empty(&patch.label) {
            self.label = Some(label.to_string());
        }
    }

    /// Override-or-base, field by field.
    pub fn apply(&self, base: &TaskDefinition) -> TaskDefinition {
        TaskDefinition {
            id: base.id.clone(),
            label: non_empty(&self.label)
                .map(str::to_string)
                .unwrap_or_else(|| base.label.clone()),
            start: self.start.unwrap_or(base.start),
            end: self.end.unwrap_or(base.end),
            owner: non_empty(&self.owner)
                .map(str::to_string)
                .unwrap_or_else(|| base.owner.clone()),
            category: base.category,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// A task created by the user rather than shipped in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomTask {
    #[serde(flatten)]
    pub task: TaskDefinition,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideStore {
    pub schema_version: String,
    #[serde(default)]
    pub overrides: BTreeMap<String, TaskOverride>,
    #[serde(default)]
    pub deleted: BTreeSet<String>,
    #[serde(default)]
    pub custom_tasks: Vec<CustomTask>,
}

impl Default for OverrideStore {
    fn default() -> Self {
        Self {
            schema_version: OVERRIDES_SCHEMA_VERSION.to_string(),
            overrides: BTreeMap::new(),
            deleted: BTreeSet::new(),
            custom_tasks: Vec::new(),
        }
    }
}

impl OverrideStore {
    pub fn get(&self, task_id: &str) -> Option<&TaskOverride> {
        self.overrides.get(task_id)
    }

    /// Merge `patch` into the override for `task_id`, creating it if absent.
    pub fn upsert(&mut self, task_id: &str, patch: TaskOverride) {
        let entry = self.overrides.entry(task_id.to_string()).or_default();
        entry.merge(patch);
        if entry.is_empty() {
            self.overrides.remove(task_id);
        }
    }

    pub fn is_deleted(&self, task_id: &str) -> bool {
        self.deleted.contains(task_id)
    }

    /// Mark deleted and drop anything keyed by the id.
    pub fn delete(&mut self, task_id: &str) {
        self.deleted.insert(task_id.to_string());
        self.overrides.remove(task_id);
        self.custom_tasks.retain(|custom| custom.task.id != task_id);
    }

    pub fn custom_task(&self, task_id: &str) -> Option<&CustomTask> {
        self.custom_tasks
            .iter()
            .find(|custom| custom.task.id == task_id)
    }

    pub fn push_custom(&mut self, task: TaskDefinition) {
        self.custom_tasks.push(CustomTask {
            task,
            created_at: Utc::now(),
        });
    }

    /// Clear every field override. Deletions and custom tasks survive.
    pub fn reset(&mut self) {
        self.overrides.clear();
    }
}
