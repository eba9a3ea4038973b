//! Search, owner, and status filtering over effective tasks.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::engine::{compute_status, EffectiveTask, TaskStatus};
use crate::error::{Error, Result};

/// Sentinel accepted by owner and status filters
pub const ALL: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OwnerFilter {
    #[default]
    All,
    Exact(String),
}

impl OwnerFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some(ALL) => OwnerFilter::All,
            Some(owner) => OwnerFilter::Exact(owner.to_string()),
        }
    }

    fn matches(&self, owner: &str) -> bool {
        match self {
            OwnerFilter::All => true,
            OwnerFilter::Exact(expected) => expected == owner,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            return Ok(StatusFilter::All);
        }
        Ok(StatusFilter::Only(trimmed.parse()?))
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub search: String,
    pub owner: OwnerFilter,
    pub status: StatusFilter,
}

impl TaskQuery {
    pub fn new(search: Option<&str>, owner: Option<&str>, status: Option<&str>) -> Result<Self> {
        let status = match status {
            Some(value) => value.parse()?,
            None => StatusFilter::All,
        };
        Ok(Self {
            search: search.unwrap_or_default().to_string(),
            owner: OwnerFilter::parse(owner),
            status,
        })
    }

    pub fn is_unfiltered(&self) -> bool {
        self.search.trim().is_empty()
            && self.owner == OwnerFilter::All
            && self.status == StatusFilter::All
    }
}

/// Stable filter; the output keeps input order.
pub fn filter_tasks(
    tasks: &[EffectiveTask],
    query: &TaskQuery,
    progress: &BTreeMap<String, u32>,
    reference: NaiveDate,
) -> Vec<EffectiveTask> {
    let needle = query.search.trim().to_lowercase();

    tasks
        .iter()
        .filter(|task| {
            needle.is_empty()
                || task.label.to_lowercase().contains(&needle)
                || task.owner.to_lowercase().contains(&needle)
        })
        .filter(|task| query.owner.matches(&task.owner))
        .filter(|task| match query.status {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => {
                let percent = progress.get(&task.id).copied().unwrap_or(0);
                compute_status(task, percent, reference) == wanted
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_sentinel_and_blank_mean_all() {
        assert_eq!(OwnerFilter::parse(Some("all")), OwnerFilter::All);
        assert_eq!(OwnerFilter::parse(Some("  ")), OwnerFilter::All);
        assert_eq!(
            OwnerFilter::parse(Some("Design")),
            OwnerFilter::Exact("Design".to_string())
        );
    }

    #[test]
    fn status_filter_rejects_unknown() {
        assert!("finished".parse::<StatusFilter>().is_err());
        assert_eq!("ALL".parse::<StatusFilter>().unwrap(), StatusFilter::All);
    }
}
