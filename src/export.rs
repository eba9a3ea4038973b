//! CSV export of the current (filtered) task view.

use chrono::NaiveDate;

use crate::engine::EffectiveTask;
use crate::state::Derived;

pub const CSV_HEADER: [&str; 6] = [
    "Task",
    "Start Date",
    "End Date",
    "Duration (days)",
    "Owner",
    "Progress (%)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// `<slug>-v<version>-<YYYY-MM-DD>.<ext>`
pub fn export_filename(slug: &str, version: &str, date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "{slug}-v{version}-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn record<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|field| quote(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn to_csv(derived: &Derived, tasks: &[EffectiveTask]) -> String {
    let mut lines = Vec::with_capacity(tasks.len() + 1);
    lines.push(record(CSV_HEADER));
    for task in tasks {
        lines.push(record([
            task.label.clone(),
            task.start.format("%Y-%m-%d").to_string(),
            task.end.format("%Y-%m-%d").to_string(),
            task.length.to_string(),
            task.owner.clone(),
            derived.percent(&task.id).to_string(),
        ]));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn task(label: &str) -> EffectiveTask {
        EffectiveTask {
            id: "t".to_string(),
            label: label.to_string(),
            start: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
            owner: "Design".to_string(),
            category: None,
            offset: 0,
            length: 4,
            custom: false,
        }
    }

    fn derived(tasks: Vec<EffectiveTask>) -> Derived {
        let mut progress = BTreeMap::new();
        progress.insert("t".to_string(), 40);
        Derived {
            reference: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            tasks,
            progress,
        }
    }

    #[test]
    fn csv_quotes_every_field_and_doubles_quotes() {
        let tasks = vec![task("Say \"hello\", world")];
        let csv = to_csv(&derived(tasks.clone()), &tasks);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "\"Task\",\"Start Date\",\"End Date\",\"Duration (days)\",\"Owner\",\"Progress (%)\""
        );
        assert_eq!(
            lines[1],
            "\"Say \"\"hello\"\", world\",\"2026-01-05\",\"2026-01-09\",\"4\",\"Design\",\"40\""
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn empty_view_exports_header_only() {
        let csv = to_csv(&derived(Vec::new()), &[]);
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn filename_follows_pattern() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(
            export_filename("brand-rebuild", "2.1", date, ExportFormat::Csv),
            "brand-rebuild-v2.1-2026-10-16.csv"
        );
    }
}
