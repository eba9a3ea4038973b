//! Human and JSON rendering for command results.
//!
//! Every command builds one serializable payload plus a [`HumanOutput`].
//! With `--json` the payload goes out inside a versioned envelope; otherwise
//! the human sections are printed unless `--quiet` is set.

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "rollout.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Text form of a command result: header, key/value summary, then lists.
#[derive(Debug, Clone, Default)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            ..Self::default()
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "no_items")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "no_items")]
    next_steps: &'a [String],
}

fn no_items(items: &&[String]) -> bool {
    items.is_empty()
}

fn print_envelope<T: Serialize>(envelope: &Envelope<'_, T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(())
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let (warnings, next_steps) = match human {
            Some(h) => (h.warnings.as_slice(), h.next_steps.as_slice()),
            None => (&[][..], &[][..]),
        };
        return print_envelope(&Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data: Some(data),
            error: None,
            warnings,
            next_steps,
        });
    }

    match human {
        Some(human) if !options.quiet => println!("{}", format_human(human)),
        _ => {}
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);

    if json {
        return print_envelope::<()>(&Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            data: None,
            error: Some(ErrorBody {
                message: err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            }),
            warnings: &[],
            next_steps: &next_steps,
        });
    }

    eprintln!("error: {err}");
    if let Some(step) = next_steps.first() {
        eprintln!("hint: {step}");
    }
    Ok(())
}

/// Summary keys are padded to a common width so values line up.
pub fn format_human(output: &HumanOutput) -> String {
    let mut out = output.header.clone();

    if !output.summary.is_empty() {
        let width = output
            .summary
            .iter()
            .map(|(key, _)| key.chars().count())
            .max()
            .unwrap_or(0);
        out.push_str("\n\nSummary:");
        for (key, value) in &output.summary {
            if value.is_empty() {
                out.push_str(&format!("\n- {key}"));
            } else {
                out.push_str(&format!("\n- {:<width$} {value}", format!("{key}:"), width = width + 1));
            }
        }
    }

    for (title, items) in [
        ("Details", &output.details),
        ("Warnings", &output.warnings),
        ("Next steps", &output.next_steps),
    ] {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("\n\n{title}:"));
        for item in items {
            out.push_str(&format!("\n- {item}"));
        }
    }

    out
}

/// Command name for error envelopes, read from argv so it works even
/// when clap never got to build a `Cli`.
pub fn infer_command_name_from_args() -> String {
    let words: Vec<String> = std::env::args()
        .skip(1)
        .filter(|arg| !arg.starts_with('-'))
        .take(2)
        .collect();

    match words.as_slice() {
        [] => "rollout".to_string(),
        [family, sub] if matches!(family.as_str(), "colors" | "export") => {
            format!("{family} {sub}")
        }
        [command, ..] => command.clone(),
    }
}

fn error_kind(err: &Error) -> &'static str {
    use crate::error::exit_codes;

    match err.exit_code() {
        exit_codes::USER_ERROR => "user_error",
        exit_codes::CATALOG_INVALID => "catalog_invalid",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::TaskNotFound(_) => vec!["rollout list".to_string()],
        Error::SubtaskNotFound { task, .. } => vec![format!("rollout progress {task}")],
        Error::InvalidConfig(_) => vec!["fix rollout.toml then retry".to_string()],
        Error::InvalidCatalog(_) => {
            vec!["fix the file named by plan.catalog then retry".to_string()]
        }
        Error::LockFailed(_) => vec!["retry once the other rollout process exits".to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_output_sections_are_ordered() {
        let mut human = HumanOutput::new("Task updated");
        human.push_summary("ID", "brand-audit");
        human.push_warning("end date is before start date");
        human.push_next_step("rollout show brand-audit");

        let text = format_human(&human);
        let summary = text.find("Summary:").unwrap();
        let warnings = text.find("Warnings:").unwrap();
        let next = text.find("Next steps:").unwrap();
        assert!(text.starts_with("Task updated"));
        assert!(summary < warnings && warnings < next);
        assert!(text.contains("- ID: brand-audit"));
    }

    #[test]
    fn summary_values_are_aligned() {
        let mut human = HumanOutput::new("Task");
        human.push_summary("ID", "logo-design");
        human.push_summary("Owner", "Design");
        let text = format_human(&human);
        assert!(text.contains("- ID:    logo-design"));
        assert!(text.contains("- Owner: Design"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let text = format_human(&HumanOutput::new("Dashboard"));
        assert_eq!(text, "Dashboard");
    }
}
