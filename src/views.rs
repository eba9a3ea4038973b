//! View models for the dashboard, timeline, countdown, owner grouping and
//! progress checklist. Each builder is pure and returns a serializable value
//! the CLI prints as text or JSON.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::engine::{days_between, EffectiveTask, TaskStatus};
use crate::error::{Error, Result};
use crate::state::{AppState, Derived};
use crate::theme::CategoryColors;

/// Character width of a timeline bar
pub const TIMELINE_WIDTH: usize = 48;

const UPCOMING_LIMIT: usize = 5;

fn mean_percent<I: IntoIterator<Item = u32>>(values: I) -> u32 {
    let (sum, count) = values
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), v| (sum + u64::from(v), count + 1));
    if count == 0 {
        0
    } else {
        ((sum as f64) / (count as f64)).round() as u32
    }
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: TaskStatus,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingTask {
    pub id: String,
    pub label: String,
    pub owner: String,
    pub start: NaiveDate,
    pub days_until: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub reference: NaiveDate,
    pub total: usize,
    pub completed: usize,
    pub mean_progress: u32,
    pub statuses: Vec<StatusCount>,
    pub upcoming: Vec<UpcomingTask>,
}

pub fn dashboard(derived: &Derived) -> Dashboard {
    let statuses: Vec<StatusCount> = TaskStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: derived
                .tasks
                .iter()
                .filter(|task| derived.status(task) == *status)
                .count(),
        })
        .collect();

    let completed = statuses
        .iter()
        .find(|entry| entry.status == TaskStatus::Completed)
        .map(|entry| entry.count)
        .unwrap_or(0);

    let mut upcoming: Vec<UpcomingTask> = derived
        .tasks
        .iter()
        .filter(|task| task.start > derived.reference)
        .map(|task| UpcomingTask {
            id: task.id.clone(),
            label: task.label.clone(),
            owner: task.owner.clone(),
            start: task.start,
            days_until: days_between(derived.reference, task.start),
        })
        .collect();
    upcoming.sort_by_key(|task| task.start);
    upcoming.truncate(UPCOMING_LIMIT);

    Dashboard {
        reference: derived.reference,
        total: derived.tasks.len(),
        completed,
        mean_progress: mean_percent(derived.tasks.iter().map(|t| derived.percent(&t.id))),
        statuses,
        upcoming,
    }
}

// =============================================================================
// Timeline
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TimelineRow {
    pub id: String,
    pub label: String,
    pub owner: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub offset: i64,
    pub length: i64,
    pub percent: u32,
    pub status: TaskStatus,
    pub color: String,
    pub bar: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub span_days: i64,
    pub rows: Vec<TimelineRow>,
}

/// Render `#` for the completed share of a task's cells and `-` for the rest.
fn render_bar(offset: i64, length: i64, percent: u32, span: i64) -> String {
    let width = TIMELINE_WIDTH as i64;
    let lead = (offset * width / span).clamp(0, width - 1);
    let cells = (length * width / span).max(1).min(width - lead);
    let filled = (cells * i64::from(percent.min(100)) / 100).min(cells);

    let mut bar = String::with_capacity(TIMELINE_WIDTH);
    bar.extend(std::iter::repeat(' ').take(lead as usize));
    bar.extend(std::iter::repeat('#').take(filled as usize));
    bar.extend(std::iter::repeat('-').take((cells - filled) as usize));
    bar
}

pub fn timeline(derived: &Derived, tasks: &[EffectiveTask], colors: &CategoryColors) -> Timeline {
    let span_days = tasks
        .iter()
        .map(|task| task.offset + task.length)
        .max()
        .unwrap_or(1)
        .max(1);

    let rows = tasks
        .iter()
        .map(|task| {
            let percent = derived.percent(&task.id);
            TimelineRow {
                id: task.id.clone(),
                label: task.label.clone(),
                owner: task.owner.clone(),
                start: task.start,
                end: task.end,
                offset: task.offset,
                length: task.length,
                percent,
                status: derived.status(task),
                color: colors.color_for(task.category).to_string(),
                bar: render_bar(task.offset, task.length, percent, span_days),
            }
        })
        .collect();

    Timeline { span_days, rows }
}

// =============================================================================
// Countdown
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CountdownKind {
    StartsIn,
    DueIn,
    Overdue,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountdownRow {
    pub id: String,
    pub label: String,
    pub owner: String,
    pub kind: CountdownKind,
    pub days: i64,
    pub target: NaiveDate,
    pub percent: u32,
}

/// Open tasks ordered by the date they are counting toward.
pub fn countdown(derived: &Derived, tasks: &[EffectiveTask]) -> Vec<CountdownRow> {
    let mut rows: Vec<CountdownRow> = tasks
        .iter()
        .filter_map(|task| {
            let (kind, target, days) = match derived.status(task) {
                TaskStatus::Completed => return None,
                TaskStatus::NotStarted => (
                    CountdownKind::StartsIn,
                    task.start,
                    days_between(derived.reference, task.start),
                ),
                TaskStatus::InProgress => (
                    CountdownKind::DueIn,
                    task.end,
                    days_between(derived.reference, task.end),
                ),
                TaskStatus::Overdue => (
                    CountdownKind::Overdue,
                    task.end,
                    days_between(task.end, derived.reference),
                ),
            };
            Some(CountdownRow {
                id: task.id.clone(),
                label: task.label.clone(),
                owner: task.owner.clone(),
                kind,
                days,
                target,
                percent: derived.percent(&task.id),
            })
        })
        .collect();
    rows.sort_by_key(|row| row.target);
    rows
}

// =============================================================================
// Owners
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OwnerTask {
    pub id: String,
    pub label: String,
    pub percent: u32,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerGroup {
    pub owner: String,
    pub count: usize,
    pub mean_progress: u32,
    pub tasks: Vec<OwnerTask>,
}

pub fn owners(derived: &Derived, tasks: &[EffectiveTask]) -> Vec<OwnerGroup> {
    let mut grouped: BTreeMap<&str, Vec<OwnerTask>> = BTreeMap::new();
    for task in tasks {
        grouped.entry(task.owner.as_str()).or_default().push(OwnerTask {
            id: task.id.clone(),
            label: task.label.clone(),
            percent: derived.percent(&task.id),
            status: derived.status(task),
        });
    }

    grouped
        .into_iter()
        .map(|(owner, tasks)| OwnerGroup {
            owner: owner.to_string(),
            count: tasks.len(),
            mean_progress: mean_percent(tasks.iter().map(|t| t.percent)),
            tasks,
        })
        .collect()
}

// =============================================================================
// Checklist
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    pub weight: f64,
    pub description: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistEntry {
    pub task_id: String,
    pub label: String,
    pub percent: u32,
    pub subtasks: Vec<ChecklistItem>,
}

fn checklist_entry(state: &AppState, derived: &Derived, task: &EffectiveTask) -> ChecklistEntry {
    let subtasks = state
        .subtasks(&task.id)
        .iter()
        .map(|subtask| ChecklistItem {
            id: subtask.id.clone(),
            label: subtask.label.clone(),
            weight: subtask.weight,
            description: subtask.description.clone(),
            done: state.progress().is_done(&task.id, &subtask.id),
        })
        .collect();
    ChecklistEntry {
        task_id: task.id.clone(),
        label: task.label.clone(),
        percent: derived.percent(&task.id),
        subtasks,
    }
}

/// One task's checklist, or every task that has subtasks
pub fn checklist(state: &AppState, derived: &Derived, task_id: Option<&str>) -> Result<Vec<ChecklistEntry>> {
    match task_id {
        Some(id) => {
            let task = derived
                .find(id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            Ok(vec![checklist_entry(state, derived, task)])
        }
        None => Ok(derived
            .tasks
            .iter()
            .filter(|task| !state.subtasks(&task.id).is_empty())
            .map(|task| checklist_entry(state, derived, task))
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_spans_whole_width_for_full_task() {
        let bar = render_bar(0, 100, 50, 100);
        assert_eq!(bar.len(), TIMELINE_WIDTH);
        assert_eq!(bar.matches('#').count(), TIMELINE_WIDTH / 2);
    }

    #[test]
    fn bar_never_empty_for_short_task() {
        let bar = render_bar(99, 1, 0, 100);
        assert_eq!(bar.trim_start().len(), 1);
        assert!(bar.len() <= TIMELINE_WIDTH);
    }

    #[test]
    fn mean_of_nothing_is_zero() {
        assert_eq!(mean_percent(Vec::new()), 0);
        assert_eq!(mean_percent(vec![50, 0, 100]), 50);
    }
}
