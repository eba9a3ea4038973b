//! Task command implementations: list, show, new, edit, rm, reset.

use chrono::NaiveDate;
use serde::Serialize;

use crate::catalog::Category;
use crate::cli::{load_context, parse_optional_date, QueryArgs, Session};
use crate::engine::{EffectiveTask, TaskStatus};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::overrides::TaskOverride;
use crate::state::{Derived, NewTask};
use crate::views::{self, ChecklistItem};

pub struct ListOptions {
    pub query: QueryArgs,
    pub session: Session,
}

pub struct ShowOptions {
    pub id: String,
    pub session: Session,
}

pub struct NewOptions {
    pub label: String,
    pub owner: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub category: Option<String>,
    pub session: Session,
}

pub struct EditOptions {
    pub id: String,
    pub label: Option<String>,
    pub owner: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub session: Session,
}

pub struct RmOptions {
    pub id: String,
    pub session: Session,
}

#[derive(Serialize)]
struct TaskRow {
    #[serde(flatten)]
    task: EffectiveTask,
    percent: u32,
    status: TaskStatus,
}

impl TaskRow {
    fn new(derived: &Derived, task: &EffectiveTask) -> Self {
        Self {
            task: task.clone(),
            percent: derived.percent(&task.id),
            status: derived.status(task),
        }
    }
}

#[derive(Serialize)]
struct TaskListOutput {
    reference: NaiveDate,
    total: usize,
    tasks: Vec<TaskRow>,
}

#[derive(Serialize)]
struct TaskShowOutput {
    #[serde(flatten)]
    row: TaskRow,
    overridden: bool,
    subtasks: Vec<ChecklistItem>,
}

#[derive(Serialize)]
struct TaskDeletedOutput {
    id: String,
    cleared_progress: bool,
}

#[derive(Serialize)]
struct ResetOutput {
    cleared: usize,
}

pub(crate) fn task_line(derived: &Derived, task: &EffectiveTask) -> String {
    format!(
        "[{}][{:>3}%] {} {} ({}, {} -> {}, {}d)",
        derived.status(task),
        derived.percent(&task.id),
        task.id,
        task.label,
        task.owner,
        task.start,
        task.end,
        task.length
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let query = options.query.to_query()?;
    let ctx = load_context(&options.session)?;
    let derived = ctx.state.derive();
    let tasks = derived.filtered(&query);

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Reference date", derived.reference.to_string());
    human.push_summary("Total", tasks.len().to_string());
    if !query.is_unfiltered() {
        human.push_summary("Filtered from", derived.tasks.len().to_string());
    }
    for task in &tasks {
        human.push_detail(task_line(&derived, task));
    }

    let output = TaskListOutput {
        reference: derived.reference,
        total: tasks.len(),
        tasks: tasks.iter().map(|task| TaskRow::new(&derived, task)).collect(),
    };

    emit_success(options.session.output(), "list", &output, Some(&human))
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(&options.session)?;
    let task = ctx.state.effective_task(&options.id)?;
    let derived = ctx.state.derive();
    let subtasks = views::checklist(&ctx.state, &derived, Some(&task.id))?
        .into_iter()
        .next()
        .map(|entry| entry.subtasks)
        .unwrap_or_default();
    let row = TaskRow::new(&derived, &task);

    let mut human = HumanOutput::new(format!("Task {}", task.id));
    human.push_summary("Label", task.label.clone());
    human.push_summary("Owner", task.owner.clone());
    human.push_summary("Start", task.start.to_string());
    human.push_summary("End", task.end.to_string());
    human.push_summary("Duration", format!("{} days", task.length));
    if let Some(category) = task.category {
        human.push_summary("Category", category.to_string());
    }
    human.push_summary("Progress", format!("{}%", row.percent));
    human.push_summary("Status", row.status.to_string());
    for subtask in &subtasks {
        human.push_detail(format!(
            "[{}] {} {} ({:.0}%)",
            if subtask.done { "x" } else { " " },
            subtask.id,
            subtask.label,
            subtask.weight * 100.0
        ));
    }

    let output = TaskShowOutput {
        overridden: ctx.state.overrides().get(&task.id).is_some(),
        row,
        subtasks,
    };
    emit_success(options.session.output(), "show", &output, Some(&human))
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let mut ctx = load_context(&options.session)?;
    let category = options
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()?;
    let new = NewTask {
        label: options.label,
        owner: options.owner,
        start: parse_optional_date(options.start.as_deref())?,
        end: parse_optional_date(options.end.as_deref())?,
        category,
    };

    let task = ctx.state.create_task(new)?;
    ctx.save_overrides()?;
    let derived = ctx.state.derive();

    let mut human = HumanOutput::new("Task created");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Label", task.label.clone());
    human.push_summary("Owner", task.owner.clone());
    human.push_summary("Dates", format!("{} -> {}", task.start, task.end));
    if task.end < task.start {
        human.push_warning("end date is before start date; duration shows as 1 day");
    }
    human.push_next_step(format!("rollout show {}", task.id));

    emit_success(
        options.session.output(),
        "new",
        &TaskRow::new(&derived, &task),
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let mut ctx = load_context(&options.session)?;
    let patch = TaskOverride {
        start: parse_optional_date(options.start.as_deref())?,
        end: parse_optional_date(options.end.as_deref())?,
        owner: options.owner,
        label: options.label,
    };

    let task = ctx.state.update_task(&options.id, patch)?;
    ctx.save_overrides()?;
    let derived = ctx.state.derive();

    let mut human = HumanOutput::new("Task updated");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Label", task.label.clone());
    human.push_summary("Owner", task.owner.clone());
    human.push_summary("Dates", format!("{} -> {}", task.start, task.end));
    if task.end < task.start {
        human.push_warning("end date is before start date; duration shows as 1 day");
    }

    emit_success(
        options.session.output(),
        "edit",
        &TaskRow::new(&derived, &task),
        Some(&human),
    )
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let mut ctx = load_context(&options.session)?;
    let had_progress = ctx.state.progress().flags(&options.id).is_some();
    ctx.state.delete_task(&options.id)?;
    ctx.save_overrides()?;
    if had_progress {
        ctx.save_progress()?;
    }

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", options.id.clone());
    if had_progress {
        human.push_summary("Progress", "cleared");
    }

    let output = TaskDeletedOutput {
        id: options.id,
        cleared_progress: had_progress,
    };
    emit_success(options.session.output(), "rm", &output, Some(&human))
}

pub fn run_reset(session: Session) -> Result<()> {
    let mut ctx = load_context(&session)?;
    let cleared = ctx.state.reset_overrides();
    ctx.save_overrides()?;

    let mut human = HumanOutput::new("Overrides reset");
    human.push_summary("Cleared", cleared.to_string());
    if !ctx.state.overrides().deleted.is_empty() {
        human.push_warning(format!(
            "{} deleted task(s) stay deleted",
            ctx.state.overrides().deleted.len()
        ));
    }

    emit_success(session.output(), "reset", &ResetOutput { cleared }, Some(&human))
}
