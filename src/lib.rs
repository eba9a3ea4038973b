//! rollout - Brand Rebuild Rollout Tracker Library
//!
//! This library provides the core functionality for the rollout CLI tool:
//! a fixed catalog of plan tasks, user edits layered on top of it, and
//! weighted subtask progress that drives task status.
//!
//! # Core Concepts
//!
//! - **Catalog**: Built-in (or configured) task definitions with dates, owners and weighted subtasks
//! - **Overrides**: Field-level edits, deletions and custom tasks kept beside the catalog
//! - **Progress**: Per-subtask done flags
//! - **Derivation**: Effective tasks, weighted percent and status for a reference date
//!
//! # Module Organization
//!
//! - `catalog`: Task and subtask definitions plus integrity checks
//! - `overrides`: Override store (edits, deletions, custom tasks)
//! - `progress`: Subtask completion store
//! - `engine`: Effective tasks, progress percentages, status
//! - `filter`: Search, owner and status filters
//! - `state`: Application state and mutations
//! - `views`: Dashboard, timeline, countdown, owner and checklist view models
//! - `export`: CSV export and export file naming
//! - `report`: PDF report rendering
//! - `theme`: Category colors
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `rollout.toml`
//! - `error`: Error types and result aliases
//! - `storage`: State directory and JSON state files
//! - `lock`: File locking and atomic writes for concurrency safety
//! - `output`: Human and JSON output for CLI commands

pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod filter;
pub mod lock;
pub mod output;
pub mod overrides;
pub mod progress;
pub mod report;
pub mod state;
pub mod storage;
pub mod theme;
pub mod views;

pub use error::{Error, Result};
