//! Subtask checklist commands: check, uncheck, toggle, progress.

use serde::Serialize;

use crate::cli::{load_context, Session};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::storage::LoadSource;
use crate::views::{self, ChecklistEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkMode {
    Check,
    Uncheck,
    Toggle,
}

impl MarkMode {
    fn command(&self) -> &'static str {
        match self {
            MarkMode::Check => "check",
            MarkMode::Uncheck => "uncheck",
            MarkMode::Toggle => "toggle",
        }
    }
}

pub struct MarkOptions {
    pub task: String,
    pub subtask: String,
    pub mode: MarkMode,
    pub session: Session,
}

pub struct ChecklistOptions {
    pub task: Option<String>,
    pub reset: bool,
    pub session: Session,
}

#[derive(Serialize)]
struct MarkOutput {
    task: String,
    subtask: String,
    done: bool,
    percent: u32,
}

#[derive(Serialize)]
struct ChecklistOutput {
    reset: bool,
    tasks: Vec<ChecklistEntry>,
}

pub fn run_mark(options: MarkOptions) -> Result<()> {
    let mut ctx = load_context(&options.session)?;
    let done = match options.mode {
        MarkMode::Check => {
            ctx.state.set_subtask(&options.task, &options.subtask, true)?;
            true
        }
        MarkMode::Uncheck => {
            ctx.state.set_subtask(&options.task, &options.subtask, false)?;
            false
        }
        MarkMode::Toggle => ctx.state.toggle_subtask(&options.task, &options.subtask)?,
    };
    ctx.save_progress()?;

    let percent = ctx.state.derive().percent(&options.task);
    tracing::debug!(task = %options.task, subtask = %options.subtask, done, percent, "subtask updated");

    let mut human = HumanOutput::new(if done {
        "Subtask checked"
    } else {
        "Subtask unchecked"
    });
    human.push_summary("Task", options.task.clone());
    human.push_summary("Subtask", options.subtask.clone());
    human.push_summary("Task progress", format!("{percent}%"));

    let output = MarkOutput {
        task: options.task,
        subtask: options.subtask,
        done,
        percent,
    };
    emit_success(options.session.output(), options.mode.command(), &output, Some(&human))
}

pub fn run_checklist(options: ChecklistOptions) -> Result<()> {
    let mut ctx = load_context(&options.session)?;

    if options.reset {
        ctx.state.reset_progress();
        ctx.save_progress()?;
    }

    let derived = ctx.state.derive();
    let entries = views::checklist(&ctx.state, &derived, options.task.as_deref())?;

    let mut human = HumanOutput::new(if options.reset {
        "Progress reset"
    } else {
        "Progress"
    });
    if ctx.progress_source == LoadSource::Missing && !options.reset && ctx.config.progress.seed_sample {
        human.push_warning("no progress file yet; showing sample progress");
    }
    for entry in &entries {
        human.push_detail(format!("{} {} ({}%)", entry.task_id, entry.label, entry.percent));
        if entry.subtasks.is_empty() {
            human.push_detail("  (no subtasks)");
        }
        for item in &entry.subtasks {
            human.push_detail(format!(
                "  [{}] {} {} ({:.0}%)",
                if item.done { "x" } else { " " },
                item.id,
                item.label,
                item.weight * 100.0
            ));
        }
    }
    if let Some(first) = entries
        .iter()
        .find_map(|entry| entry.subtasks.iter().find(|item| !item.done).map(|item| (entry, item)))
    {
        human.push_next_step(format!("rollout check {} {}", first.0.task_id, first.1.id));
    }

    let output = ChecklistOutput {
        reset: options.reset,
        tasks: entries,
    };
    emit_success(options.session.output(), "progress", &output, Some(&human))
}
