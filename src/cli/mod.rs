//! Command-line interface for rollout
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command family is implemented in its own submodule.

use std::path::PathBuf;

use chrono::Local;
use clap::{Args, Parser, Subcommand};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::engine::parse_date;
use crate::error::Result;
use crate::filter::TaskQuery;
use crate::output::OutputOptions;
use crate::state::AppState;
use crate::storage::{LoadSource, Storage};

mod colors;
mod export;
mod progress;
mod task;
mod view;

/// rollout - brand rebuild plan tracker
///
/// Tracks a rollout plan as a timeline of tasks with weighted subtask
/// progress. State lives in a local directory of JSON files.
#[derive(Parser, Debug)]
#[command(name = "rollout")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding state files (defaults to the platform data dir)
    #[arg(long, global = true, env = "ROLLOUT_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Path to rollout.toml (defaults to <state dir>/rollout.toml)
    #[arg(long, global = true, env = "ROLLOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reference date for status calculations (YYYY-MM-DD, defaults to today)
    #[arg(long, global = true, env = "ROLLOUT_DATE")]
    pub date: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Search, owner and status filters shared by list-style commands
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Case-insensitive match against label or owner
    #[arg(short, long)]
    pub search: Option<String>,

    /// Exact owner, or "all"
    #[arg(long)]
    pub owner: Option<String>,

    /// completed, in-progress, not-started, overdue, or "all"
    #[arg(long)]
    pub status: Option<String>,
}

impl QueryArgs {
    pub fn to_query(&self) -> Result<TaskQuery> {
        TaskQuery::new(
            self.search.as_deref(),
            self.owner.as_deref(),
            self.status.as_deref(),
        )
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List effective tasks
    List {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Show one task with its subtasks
    Show {
        /// Task ID
        id: String,
    },

    /// Create a custom task
    New {
        /// Task label
        label: String,

        /// Owner (defaults to tasks.default_owner)
        #[arg(long)]
        owner: Option<String>,

        /// Start date (defaults to the reference date)
        #[arg(long)]
        start: Option<String>,

        /// End date (defaults to start + 7 days)
        #[arg(long)]
        end: Option<String>,

        /// Category: strategy, identity, digital, content, launch
        #[arg(long)]
        category: Option<String>,
    },

    /// Override fields of a task
    Edit {
        /// Task ID
        id: String,

        #[arg(long)]
        label: Option<String>,

        #[arg(long)]
        owner: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,
    },

    /// Delete a task (irreversible)
    Rm {
        /// Task ID
        id: String,
    },

    /// Drop all field overrides, reverting tasks to catalog values
    Reset,

    /// Mark a subtask done
    Check {
        task: String,
        subtask: String,
    },

    /// Mark a subtask not done
    Uncheck {
        task: String,
        subtask: String,
    },

    /// Flip a subtask's done flag
    Toggle {
        task: String,
        subtask: String,
    },

    /// Show the subtask checklist
    Progress {
        /// Limit to one task
        task: Option<String>,

        /// Clear all subtask progress
        #[arg(long, conflicts_with = "task")]
        reset: bool,
    },

    /// Summary counts and upcoming work
    Dashboard,

    /// Gantt-style timeline
    Timeline {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Days until start, due, or overdue for open tasks
    Countdown {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Tasks grouped by owner
    Owners {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Export the current view
    #[command(subcommand)]
    Export(ExportCommands),

    /// Category colors
    #[command(subcommand)]
    Colors(ColorCommands),
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Write a CSV file
    Csv {
        #[command(flatten)]
        query: QueryArgs,

        /// Output directory (defaults to export.out_dir or the working dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write a PDF report
    Pdf {
        #[command(flatten)]
        query: QueryArgs,

        /// Output directory (defaults to export.out_dir or the working dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Color subcommands
#[derive(Subcommand, Debug)]
pub enum ColorCommands {
    /// Show category colors
    List,

    /// Set a category color
    Set {
        /// Category name
        category: String,

        /// Hex color, e.g. #10b981
        color: String,
    },

    /// Restore default colors
    Reset,
}

/// Global options every command needs
#[derive(Debug, Clone)]
pub struct Session {
    pub state_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub date: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

impl Session {
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

/// Loaded state plus where to write it back
pub(crate) struct Context {
    pub storage: Storage,
    pub config: Config,
    pub state: AppState,
    pub progress_source: LoadSource,
}

impl Context {
    pub fn save_overrides(&self) -> Result<()> {
        self.storage.save_overrides(self.state.overrides())
    }

    pub fn save_progress(&self) -> Result<()> {
        self.storage.save_progress(self.state.progress())
    }

    pub fn save_colors(&self) -> Result<()> {
        self.storage.save_colors(self.state.colors())
    }

    /// Export file name: `<slug>-v<catalog version>-<today>.<ext>`
    pub fn export_filename(&self, format: crate::export::ExportFormat) -> String {
        crate::export::export_filename(
            &self.config.plan.slug,
            &self.state.catalog().version,
            Local::now().date_naive(),
            format,
        )
    }

    pub fn report_title(&self) -> String {
        format!(
            "{} v{}",
            self.config.plan.name,
            self.state.catalog().version
        )
    }
}

pub(crate) fn load_context(session: &Session) -> Result<Context> {
    let storage = Storage::resolve(session.state_dir.clone())?;

    let config = match session.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&storage.config_file()),
    };
    let config_dir = session
        .config
        .as_deref()
        .and_then(|path| path.parent())
        .map(PathBuf::from)
        .unwrap_or_else(|| storage.state_dir().to_path_buf());

    let catalog = match config.plan.catalog.as_deref() {
        Some(path) => {
            let path = if path.is_relative() {
                config_dir.join(path)
            } else {
                path.to_path_buf()
            };
            tracing::debug!(path = %path.display(), "loading catalog");
            Catalog::load(&path)?
        }
        None => Catalog::builtin()?,
    };

    let epoch = config.plan.kickoff_date()?;
    let reference = match session.date.as_deref() {
        Some(value) => parse_date(value)?,
        None => Local::now().date_naive(),
    };

    let (overrides, _) = storage.load_overrides();
    let (progress, progress_source) = storage.load_progress(config.progress.seed_sample);
    let (colors, _) = storage.load_colors();

    let state = AppState::new(catalog, overrides, progress, colors, epoch, reference)
        .with_default_owner(config.tasks.default_owner.clone());

    Ok(Context {
        storage,
        config,
        state,
        progress_source,
    })
}

pub(crate) fn parse_optional_date(value: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
    value.map(parse_date).transpose()
}

impl Cli {
    fn session(&self) -> Session {
        Session {
            state_dir: self.state_dir.clone(),
            config: self.config.clone(),
            date: self.date.clone(),
            json: self.json,
            quiet: self.quiet,
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let session = self.session();
        match self.command {
            Commands::List { query } => task::run_list(task::ListOptions { query, session }),
            Commands::Show { id } => task::run_show(task::ShowOptions { id, session }),
            Commands::New {
                label,
                owner,
                start,
                end,
                category,
            } => task::run_new(task::NewOptions {
                label,
                owner,
                start,
                end,
                category,
                session,
            }),
            Commands::Edit {
                id,
                label,
                owner,
                start,
                end,
            } => task::run_edit(task::EditOptions {
                id,
                label,
                owner,
                start,
                end,
                session,
            }),
            Commands::Rm { id } => task::run_rm(task::RmOptions { id, session }),
            Commands::Reset => task::run_reset(session),
            Commands::Check { task, subtask } => progress::run_mark(progress::MarkOptions {
                task,
                subtask,
                mode: progress::MarkMode::Check,
                session,
            }),
            Commands::Uncheck { task, subtask } => progress::run_mark(progress::MarkOptions {
                task,
                subtask,
                mode: progress::MarkMode::Uncheck,
                session,
            }),
            Commands::Toggle { task, subtask } => progress::run_mark(progress::MarkOptions {
                task,
                subtask,
                mode: progress::MarkMode::Toggle,
                session,
            }),
            Commands::Progress { task, reset } => {
                progress::run_checklist(progress::ChecklistOptions {
                    task,
                    reset,
                    session,
                })
            }
            Commands::Dashboard => view::run_dashboard(session),
            Commands::Timeline { query } => view::run_timeline(view::ViewOptions { query, session }),
            Commands::Countdown { query } => {
                view::run_countdown(view::ViewOptions { query, session })
            }
            Commands::Owners { query } => view::run_owners(view::ViewOptions { query, session }),
            Commands::Export(cmd) => match cmd {
                ExportCommands::Csv { query, out } => export::run(export::ExportOptions {
                    format: crate::export::ExportFormat::Csv,
                    query,
                    out,
                    session,
                }),
                ExportCommands::Pdf { query, out } => export::run(export::ExportOptions {
                    format: crate::export::ExportFormat::Pdf,
                    query,
                    out,
                    session,
                }),
            },
            Commands::Colors(cmd) => match cmd {
                ColorCommands::List => colors::run_list(session),
                ColorCommands::Set { category, color } => colors::run_set(colors::SetOptions {
                    category,
                    color,
                    session,
                }),
                ColorCommands::Reset => colors::run_reset(session),
            },
        }
    }
}
