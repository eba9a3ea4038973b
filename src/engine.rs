//! Derivation engine.
//!
//! Pure functions from the three stores to what every view consumes:
//! effective tasks, weighted progress, and lifecycle status against a
//! reference date. Nothing here owns state or touches disk.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, SubtaskDefinition, TaskDefinition};
use crate::error::{Error, Result};
use crate::overrides::{CustomTask, TaskOverride};
use crate::progress::ProgressStore;

/// A task after overrides and deletions are applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EffectiveTask {
    pub id: String,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Days from the plan epoch to `start`, floored at zero
    pub offset: i64,
    /// Days from `start` to `end`, floored at one
    pub length: i64,
    #[serde(default)]
    pub custom: bool,
}

impl EffectiveTask {
    fn from_definition(task: TaskDefinition, epoch: NaiveDate, custom: bool) -> Self {
        let offset = days_between(epoch, task.start).max(0);
        let length = days_between(task.start, task.end).max(1);
        Self {
            id: task.id,
            label: task.label,
            start: task.start,
            end: task.end,
            owner: task.owner,
            category: task.category,
            offset,
            length,
            custom,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Completed,
    InProgress,
    NotStarted,
    Overdue,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Completed,
        TaskStatus::InProgress,
        TaskStatus::NotStarted,
        TaskStatus::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::NotStarted => "not-started",
            TaskStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        TaskStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown status '{}' (expected completed|in-progress|not-started|overdue)",
                    s.trim()
                ))
            })
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| Error::InvalidDate(trimmed.to_string()))
}

/// Signed whole days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Catalog first, then custom tasks in creation order; deleted ids dropped,
/// overrides merged.
pub fn compute_effective_tasks(
    catalog: &[TaskDefinition],
    custom_tasks: &[CustomTask],
    overrides: &BTreeMap<String, TaskOverride>,
    deletions: &BTreeSet<String>,
    epoch: NaiveDate,
) -> Vec<EffectiveTask> {
    let base = catalog
        .iter()
        .map(|task| (task, false))
        .chain(custom_tasks.iter().map(|custom| (&custom.task, true)));

    base.filter(|(task, _)| !deletions.contains(&task.id))
        .map(|(task, custom)| {
            let merged = match overrides.get(&task.id) {
                Some(patch) => patch.apply(task),
                None => task.clone(),
            };
            EffectiveTask::from_definition(merged, epoch, custom)
        })
        .collect()
}

/// Weighted percent for one task's subtasks. Weights are taken as-is.
pub fn weighted_percent(task_id: &str, subtasks: &[SubtaskDefinition], completion: &ProgressStore) -> u32 {
    let done: f64 = subtasks
        .iter()
        .filter(|subtask| completion.is_done(task_id, &subtask.id))
        .map(|subtask| subtask.weight)
        .sum();
    (done * 100.0).round().max(0.0) as u32
}

pub fn compute_progress(
    subtask_definitions: &BTreeMap<String, Vec<SubtaskDefinition>>,
    completion: &ProgressStore,
    tasks: &[EffectiveTask],
) -> BTreeMap<String, u32> {
    let mut progress: BTreeMap<String, u32> = subtask_definitions
        .iter()
        .map(|(task_id, subtasks)| (task_id.clone(), weighted_percent(task_id, subtasks, completion)))
        .collect();

    for task in tasks {
        progress.entry(task.id.clone()).or_insert(0);
    }
    progress
}

/// First match wins: completed, not-started, overdue, in-progress.
pub fn compute_status(task: &EffectiveTask, percent: u32, reference: NaiveDate) -> TaskStatus {
    if percent >= 100 {
        TaskStatus::Completed
    } else if reference < task.start {
        TaskStatus::NotStarted
    } else if reference > task.end {
        TaskStatus::Overdue
    } else {
        TaskStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn def(id: &str, start: NaiveDate, end: NaiveDate) -> TaskDefinition {
        TaskDefinition {
            id: id.to_string(),
            label: id.to_uppercase(),
            start,
            end,
            owner: "Design".to_string(),
            category: None,
        }
    }

    #[test]
    fn offset_floors_at_zero_before_epoch() {
        let tasks = compute_effective_tasks(
            &[def("early", date(2025, 12, 20), date(2026, 1, 3))],
            &[],
            &BTreeMap::new(),
            &BTreeSet::new(),
            date(2026, 1, 1),
        );
        assert_eq!(tasks[0].offset, 0);
        assert_eq!(tasks[0].length, 14);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(parse_date(" 2026-03-01 ").unwrap(), date(2026, 3, 1));
        assert!(matches!(parse_date("03/01/2026"), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn status_parses_underscore_form() {
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("Not-Started".parse::<TaskStatus>().unwrap(), TaskStatus::NotStarted);
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn undersized_weights_are_not_renormalized() {
        let subtasks = vec![
            SubtaskDefinition {
                id: "a".to_string(),
                label: "a".to_string(),
                weight: 0.3,
                description: String::new(),
            },
            SubtaskDefinition {
                id: "b".to_string(),
                label: "b".to_string(),
                weight: 0.3,
                description: String::new(),
            },
        ];
        let mut completion = ProgressStore::new();
        completion.set("t", "a", true);
        completion.set("t", "b", true);
        assert_eq!(weighted_percent("t", &subtasks, &completion), 60);
    }

    #[test]
    fn tasks_without_subtasks_report_zero() {
        let tasks = compute_effective_tasks(
            &[def("plain", date(2026, 1, 1), date(2026, 1, 2))],
            &[],
            &BTreeMap::new(),
            &BTreeSet::new(),
            date(2026, 1, 1),
        );
        let progress = compute_progress(&BTreeMap::new(), &ProgressStore::new(), &tasks);
        assert_eq!(progress.get("plain"), Some(&0));
    }
}
