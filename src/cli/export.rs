//! `rollout export csv|pdf`

use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;

use crate::cli::{load_context, QueryArgs, Session};
use crate::error::Result;
use crate::export::{to_csv, ExportFormat};
use crate::lock::write_atomic;
use crate::output::{emit_success, HumanOutput};
use crate::report::render_pdf;

pub struct ExportOptions {
    pub format: ExportFormat,
    pub query: QueryArgs,
    pub out: Option<PathBuf>,
    pub session: Session,
}

#[derive(Serialize)]
struct ExportOutput {
    path: PathBuf,
    rows: usize,
    bytes: usize,
}

pub fn run(options: ExportOptions) -> Result<()> {
    let query = options.query.to_query()?;
    let ctx = load_context(&options.session)?;
    let derived = ctx.state.derive();
    let tasks = derived.filtered(&query);

    let out_dir = options
        .out
        .clone()
        .or_else(|| ctx.config.export.out_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)?;
    let path = out_dir.join(ctx.export_filename(options.format));

    let bytes = match options.format {
        ExportFormat::Csv => to_csv(&derived, &tasks).into_bytes(),
        ExportFormat::Pdf => render_pdf(
            &ctx.report_title(),
            &derived,
            &tasks,
            Local::now().date_naive(),
        ),
    };
    write_atomic(&path, &bytes)?;
    tracing::info!(path = %path.display(), rows = tasks.len(), "export written");

    let command = match options.format {
        ExportFormat::Csv => "export csv",
        ExportFormat::Pdf => "export pdf",
    };

    let mut human = HumanOutput::new("Export written");
    human.push_summary("File", path.display().to_string());
    human.push_summary("Rows", tasks.len().to_string());
    if tasks.is_empty() {
        human.push_warning("no tasks matched the current filters");
    }

    let output = ExportOutput {
        path,
        rows: tasks.len(),
        bytes: bytes.len(),
    };
    emit_success(options.session.output(), command, &output, Some(&human))
}
