//! Application state.
//!
//! `AppState` owns the catalog, the override and progress stores, and the
//! category colors. All mutation goes through its methods; derivation is
//! delegated to [`crate::engine`].

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use ulid::Ulid;

use crate::catalog::{Catalog, Category, SubtaskDefinition, TaskDefinition};
use crate::engine::{self, EffectiveTask, TaskStatus};
use crate::error::{Error, Result};
use crate::filter::{filter_tasks, TaskQuery};
use crate::overrides::{OverrideStore, TaskOverride};
use crate::progress::ProgressStore;
use crate::theme::CategoryColors;

pub const CUSTOM_ID_PREFIX: &str = "custom-";

/// Length given to a new task when only a start date is supplied
const DEFAULT_NEW_TASK_DAYS: u64 = 7;

/// Fields for a user-created task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub label: String,
    pub owner: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category: Option<Category>,
}

/// Everything the views need, computed once per invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Derived {
    pub reference: NaiveDate,
    pub tasks: Vec<EffectiveTask>,
    pub progress: BTreeMap<String, u32>,
}

impl Derived {
    pub fn percent(&self, task_id: &str) -> u32 {
        self.progress.get(task_id).copied().unwrap_or(0)
    }

    pub fn status(&self, task: &EffectiveTask) -> TaskStatus {
        engine::compute_status(task, self.percent(&task.id), self.reference)
    }

    pub fn filtered(&self, query: &TaskQuery) -> Vec<EffectiveTask> {
        filter_tasks(&self.tasks, query, &self.progress, self.reference)
    }

    pub fn find(&self, task_id: &str) -> Option<&EffectiveTask> {
        self.tasks.iter().find(|task| task.id == task_id)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    catalog: Catalog,
    overrides: OverrideStore,
    progress: ProgressStore,
    colors: CategoryColors,
    epoch: NaiveDate,
    reference: NaiveDate,
    default_owner: String,
}

impl AppState {
    pub fn new(
        catalog: Catalog,
        overrides: OverrideStore,
        progress: ProgressStore,
        colors: CategoryColors,
        epoch: NaiveDate,
        reference: NaiveDate,
    ) -> Self {
        Self {
            catalog,
            overrides,
            progress,
            colors,
            epoch,
            reference,
            default_owner: "Marketing".to_string(),
        }
    }

    pub fn with_default_owner(mut self, owner: impl Into<String>) -> Self {
        self.default_owner = owner.into();
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn overrides(&self) -> &OverrideStore {
        &self.overrides
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn colors(&self) -> &CategoryColors {
        &self.colors
    }

    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    pub fn set_reference(&mut self, reference: NaiveDate) {
        self.reference = reference;
    }

    // =========================================================================
    // Derivation
    // =========================================================================

    pub fn effective_tasks(&self) -> Vec<EffectiveTask> {
        engine::compute_effective_tasks(
            &self.catalog.tasks,
            &self.overrides.custom_tasks,
            &self.overrides.overrides,
            &self.overrides.deleted,
            self.epoch,
        )
    }

    pub fn derive(&self) -> Derived {
        let tasks = self.effective_tasks();
        let progress = engine::compute_progress(&self.catalog.subtasks, &self.progress, &tasks);
        Derived {
            reference: self.reference,
            tasks,
            progress,
        }
    }

    pub fn effective_task(&self, task_id: &str) -> Result<EffectiveTask> {
        self.ensure_live(task_id)?;
        self.effective_tasks()
            .into_iter()
            .find(|task| task.id == task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    pub fn subtasks(&self, task_id: &str) -> &[SubtaskDefinition] {
        self.catalog.subtasks_for(task_id).unwrap_or_default()
    }

    fn ensure_live(&self, task_id: &str) -> Result<()> {
        let known = self.catalog.contains(task_id) || self.overrides.custom_task(task_id).is_some();
        if !known || self.overrides.is_deleted(task_id) {
            return Err(Error::TaskNotFound(task_id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Task mutations
    // =========================================================================

    /// Merge a partial edit into the task's override. end < start is kept as given.
    pub fn update_task(&mut self, task_id: &str, patch: TaskOverride) -> Result<EffectiveTask> {
        self.ensure_live(task_id)?;
        if patch.is_empty() {
            return Err(Error::InvalidArgument(
                "nothing to update; pass at least one field".to_string(),
            ));
        }
        self.overrides.upsert(task_id, patch);
        let task = self.effective_task(task_id)?;
        if task.end < task.start {
            tracing::warn!(task = task_id, start = %task.start, end = %task.end, "task ends before it starts");
        }
        Ok(task)
    }

    pub fn create_task(&mut self, new: NewTask) -> Result<EffectiveTask> {
        let label = new.label.trim();
        if label.is_empty() {
            return Err(Error::InvalidArgument("label cannot be empty".to_string()));
        }

        let start = new.start.unwrap_or(self.reference);
        let end = match new.end {
            Some(end) => end,
            None => start
                .checked_add_days(Days::new(DEFAULT_NEW_TASK_DAYS))
                .unwrap_or(start),
        };
        let owner = new
            .owner
            .as_deref()
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
            .unwrap_or(self.default_owner.as_str())
            .to_string();

        let id = self.generate_task_id();
        self.overrides.push_custom(TaskDefinition {
            id: id.clone(),
            label: label.to_string(),
            start,
            end,
            owner,
            category: new.category,
        });
        tracing::debug!(task = %id, "created custom task");
        self.effective_task(&id)
    }

    /// Irreversible: resetting overrides does not bring the task back.
    pub fn delete_task(&mut self, task_id: &str) -> Result<()> {
        self.ensure_live(task_id)?;
        self.overrides.delete(task_id);
        self.progress.remove_task(task_id);
        Ok(())
    }

    /// Drop every field override; returns how many were cleared
    pub fn reset_overrides(&mut self) -> usize {
        let cleared = self.overrides.overrides.len();
        self.overrides.reset();
        cleared
    }

    fn generate_task_id(&self) -> String {
        loop {
            let id = format!("{CUSTOM_ID_PREFIX}{}", Ulid::new().to_string().to_lowercase());
            let taken = self.catalog.contains(&id)
                || self.overrides.custom_task(&id).is_some()
                || self.overrides.is_deleted(&id);
            if !taken {
                return id;
            }
        }
    }

    // =========================================================================
    // Progress mutations
    // =========================================================================

    fn ensure_subtask(&self, task_id: &str, subtask_id: &str) -> Result<()> {
        self.ensure_live(task_id)?;
        if self.subtasks(task_id).iter().any(|s| s.id == subtask_id) {
            Ok(())
        } else {
            Err(Error::SubtaskNotFound {
                task: task_id.to_string(),
                subtask: subtask_id.to_string(),
            })
        }
    }

    pub fn set_subtask(&mut self, task_id: &str, subtask_id: &str, done: bool) -> Result<()> {
        self.ensure_subtask(task_id, subtask_id)?;
        self.progress.set(task_id, subtask_id, done);
        Ok(())
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<bool> {
        self.ensure_subtask(task_id, subtask_id)?;
        Ok(self.progress.toggle(task_id, subtask_id))
    }

    pub fn reset_progress(&mut self) {
        self.progress.clear();
    }

    // =========================================================================
    // Theme
    // =========================================================================

    pub fn set_category_color(&mut self, category: Category, value: &str) -> Result<String> {
        self.colors.set(category, value)
    }

    pub fn reset_category_colors(&mut self) {
        self.colors = CategoryColors::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state() -> AppState {
        AppState::new(
            Catalog::builtin().unwrap(),
            OverrideStore::default(),
            ProgressStore::new(),
            CategoryColors::default(),
            date(2026, 1, 5),
            date(2026, 2, 1),
        )
    }

    #[test]
    fn create_rejects_blank_label_without_change() {
        let mut state = state();
        let before = state.effective_tasks().len();
        let err = state
            .create_task(NewTask {
                label: "   ".to_string(),
                ..NewTask::default()
            })
            .expect_err("blank label");
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(state.effective_tasks().len(), before);
        assert!(state.overrides().custom_tasks.is_empty());
    }

    #[test]
    fn create_defaults_dates_and_owner() {
        let mut state = state().with_default_owner("Design");
        let task = state
            .create_task(NewTask {
                label: "Launch party".to_string(),
                ..NewTask::default()
            })
            .unwrap();
        assert!(task.id.starts_with(CUSTOM_ID_PREFIX));
        assert!(task.custom);
        assert_eq!(task.owner, "Design");
        assert_eq!(task.start, date(2026, 2, 1));
        assert_eq!(task.end, date(2026, 2, 8));
        assert_eq!(state.effective_tasks().last().map(|t| t.id.clone()), Some(task.id));
    }

    #[test]
    fn generated_ids_are_distinct() {
        let mut state = state();
        let a = state
            .create_task(NewTask { label: "a".to_string(), ..NewTask::default() })
            .unwrap();
        let b = state
            .create_task(NewTask { label: "b".to_string(), ..NewTask::default() })
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn update_unknown_or_deleted_task_fails() {
        let mut state = state();
        let patch = TaskOverride {
            owner: Some("Product".to_string()),
            ..TaskOverride::default()
        };
        assert!(matches!(
            state.update_task("nope", patch.clone()),
            Err(Error::TaskNotFound(_))
        ));
        state.delete_task("positioning").unwrap();
        assert!(matches!(
            state.update_task("positioning", patch),
            Err(Error::TaskNotFound(_))
        ));
    }

    #[test]
    fn update_keeps_inverted_dates_and_clamps_length() {
        let mut state = state();
        let task = state
            .update_task(
                "brand-audit",
                TaskOverride {
                    end: Some(date(2026, 1, 1)),
                    ..TaskOverride::default()
                },
            )
            .unwrap();
        assert!(task.end < task.start);
        assert_eq!(task.length, 1);
    }

    #[test]
    fn toggle_unknown_subtask_fails() {
        let mut state = state();
        assert!(matches!(
            state.toggle_subtask("brand-audit", "nope"),
            Err(Error::SubtaskNotFound { .. })
        ));
        assert!(state.toggle_subtask("brand-audit", "inventory").unwrap());
        assert_eq!(state.derive().percent("brand-audit"), 25);
    }

    #[test]
    fn deleting_custom_task_removes_record() {
        let mut state = state();
        let task = state
            .create_task(NewTask { label: "temp".to_string(), ..NewTask::default() })
            .unwrap();
        state.delete_task(&task.id).unwrap();
        assert!(state.overrides().custom_task(&task.id).is_none());
        assert!(state.derive().find(&task.id).is_none());
    }
}
