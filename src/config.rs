//! Configuration loading and management
//!
//! Handles parsing of `rollout.toml`, looked up in the state directory
//! unless `--config` names another file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::engine::parse_date;

pub const CONFIG_FILE: &str = "rollout.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Plan identity and catalog source
    #[serde(default)]
    pub plan: PlanConfig,

    /// Defaults for user-created tasks
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Subtask progress behavior
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Display name used in report titles
    #[serde(default = "default_plan_name")]
    pub name: String,

    /// Filename prefix for exports
    #[serde(default = "default_plan_slug")]
    pub slug: String,

    /// Timeline epoch (YYYY-MM-DD); task offsets count from here
    #[serde(default = "default_kickoff")]
    pub kickoff: String,

    /// Optional JSON catalog replacing the built-in plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
}

fn default_plan_name() -> String {
    "Brand Rebuild".to_string()
}

fn default_plan_slug() -> String {
    "brand-rebuild".to_string()
}

fn default_kickoff() -> String {
    "2026-01-05".to_string()
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            name: default_plan_name(),
            slug: default_plan_slug(),
            kickoff: default_kickoff(),
            catalog: None,
        }
    }
}

impl PlanConfig {
    pub fn kickoff_date(&self) -> crate::error::Result<NaiveDate> {
        parse_date(&self.kickoff).map_err(|_| {
            crate::error::Error::InvalidConfig(format!(
                "plan.kickoff '{}' is not a YYYY-MM-DD date",
                self.kickoff
            ))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Owner assigned to new tasks when none is given
    #[serde(default = "default_owner")]
    pub default_owner: String,
}

fn default_owner() -> String {
    "Marketing".to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_owner: default_owner(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Seed sample completion data when no progress file exists yet
    #[serde(default = "default_true")]
    pub seed_sample: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self { seed_sample: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for exported files (defaults to the working directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a `rollout.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration if present and valid, otherwise defaults
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.plan.validate()?;
        if self.tasks.default_owner.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.default_owner cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl PlanConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if self.name.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "plan.name cannot be empty".to_string(),
            ));
        }
        let slug = self.slug.trim();
        if slug.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "plan.slug cannot be empty".to_string(),
            ));
        }
        if !slug
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(crate::error::Error::InvalidConfig(format!(
                "plan.slug '{slug}' must be alphanumeric, '-' or '_'"
            )));
        }
        self.kickoff_date()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.plan.name, "Brand Rebuild");
        assert_eq!(cfg.plan.slug, "brand-rebuild");
        assert_eq!(
            cfg.plan.kickoff_date().expect("kickoff"),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
        );
        assert!(cfg.plan.catalog.is_none());
        assert_eq!(cfg.tasks.default_owner, "Marketing");
        assert!(cfg.progress.seed_sample);
        assert!(cfg.export.out_dir.is_none());
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[plan]
name = "Spring Refresh"
slug = "spring-refresh"
kickoff = "2026-03-02"
catalog = "plan.json"

[tasks]
default_owner = "Design"

[progress]
seed_sample = false

[export]
out_dir = "exports"
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.plan.name, "Spring Refresh");
        assert_eq!(cfg.plan.slug, "spring-refresh");
        assert_eq!(cfg.plan.kickoff, "2026-03-02");
        assert_eq!(cfg.plan.catalog, Some(PathBuf::from("plan.json")));
        assert_eq!(cfg.tasks.default_owner, "Design");
        assert!(!cfg.progress.seed_sample);
        assert_eq!(cfg.export.out_dir, Some(PathBuf::from("exports")));
    }

    #[test]
    fn invalid_kickoff_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[plan]\nkickoff = \"soon\"").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_slug_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[plan]\nslug = \"a b/c\"").expect("write config");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn load_or_default_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_or_default(&dir.path().join(CONFIG_FILE));
        assert_eq!(cfg.plan.slug, "brand-rebuild");
    }

    #[test]
    fn load_or_default_on_invalid_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[tasks]\ndefault_owner = 12").expect("write config");
        let cfg = Config::load_or_default(&path);
        assert_eq!(cfg.tasks.default_owner, "Marketing");
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        Config::default().save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("slug = \"brand-rebuild\""));
    }
}
