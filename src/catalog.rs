//! Task catalog for rollout.
//!
//! The catalog is the immutable base plan: task definitions plus the weighted
//! subtasks under each task. The brand rebuild plan is compiled in; a
//! replacement can be loaded from a JSON file with the same shape.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const BUILTIN_CATALOG: &str = include_str!("data/brand_rebuild.json");

/// Allowed drift when checking that subtask weights sum to one
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Secondary tag used for color-coding tasks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Strategy,
    Identity,
    Digital,
    Content,
    Launch,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Strategy,
        Category::Identity,
        Category::Digital,
        Category::Content,
        Category::Launch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Strategy => "strategy",
            Category::Identity => "identity",
            Category::Digital => "digital",
            Category::Content => "content",
            Category::Launch => "launch",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown category '{trimmed}' (expected strategy|identity|digital|content|launch)"
                ))
            })
    }
}

/// Base task definition. Never mutated; edits go through overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDefinition {
    pub id: String,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubtaskDefinition {
    pub id: String,
    pub label: String,
    pub weight: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub version: String,
    pub tasks: Vec<TaskDefinition>,
    #[serde(default)]
    pub subtasks: BTreeMap<String, Vec<SubtaskDefinition>>,
}

impl Catalog {
    /// The compiled-in brand rebuild plan
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Parse and validate a catalog from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(content)
            .map_err(|err| Error::InvalidCatalog(format!("parse failed: {err}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn task(&self, id: &str) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn subtasks_for(&self, task_id: &str) -> Option<&[SubtaskDefinition]> {
        self.subtasks.get(task_id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.task(id).is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(Error::InvalidCatalog("version cannot be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            let id = task.id.trim();
            if id.is_empty() {
                return Err(Error::InvalidCatalog("task id cannot be empty".to_string()));
            }
            if !seen.insert(id) {
                return Err(Error::InvalidCatalog(format!("duplicate task id '{id}'")));
            }
            if task.label.trim().is_empty() {
                return Err(Error::InvalidCatalog(format!("task '{id}' has an empty label")));
            }
            if task.end < task.start {
                return Err(Error::InvalidCatalog(format!(
                    "task '{id}' ends ({}) before it starts ({})",
                    task.end, task.start
                )));
            }
        }

        for (task_id, subtasks) in &self.subtasks {
            if !seen.contains(task_id.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "subtasks listed for unknown task '{task_id}'"
                )));
            }
            validate_subtasks(task_id, subtasks)?;
        }

        Ok(())
    }
}

fn validate_subtasks(task_id: &str, subtasks: &[SubtaskDefinition]) -> Result<()> {
    if subtasks.is_empty() {
        return Ok(());
    }

    let mut seen = HashSet::new();
    let mut total = 0.0;
    for subtask in subtasks {
        if !seen.insert(subtask.id.as_str()) {
            return Err(Error::InvalidCatalog(format!(
                "task '{task_id}' has duplicate subtask '{}'",
                subtask.id
            )));
        }
        if !(0.0..=1.0).contains(&subtask.weight) {
            return Err(Error::InvalidCatalog(format!(
                "subtask '{task_id}/{}' weight {} outside [0, 1]",
                subtask.id, subtask.weight
            )));
        }
        total += subtask.weight;
    }

    if (total - 1.0).abs() > WEIGHT_EPSILON {
        return Err(Error::InvalidCatalog(format!(
            "subtask weights for '{task_id}' sum to {total:.4}, expected 1.0"
        )));
    }
    Ok(())
}
