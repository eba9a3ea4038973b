//! PDF report export.
//!
//! Writes a landscape A4 PDF 1.4 document using the two standard Helvetica
//! faces, so no fonts are embedded. Layout is a title, a summary line, and
//! one table row per task. A page break happens when the cursor would cross
//! the bottom margin.

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::engine::{EffectiveTask, TaskStatus};
use crate::state::Derived;

const PAGE_WIDTH: u32 = 842;
const PAGE_HEIGHT: u32 = 595;
const MARGIN_LEFT: i32 = 40;
const TITLE_Y: i32 = 555;
const SUMMARY_Y: i32 = 532;
const FIRST_HEADER_Y: i32 = 505;
const ROW_HEIGHT: i32 = 16;
const PAGE_BOTTOM: i32 = 50;
const MAX_LABEL_CHARS: usize = 58;

/// Column x positions: task, start, end, duration, owner, progress
const COLUMNS: [i32; 6] = [MARGIN_LEFT, 370, 450, 530, 610, 730];
const HEADERS: [&str; 6] = ["Task", "Start Date", "End Date", "Duration (days)", "Owner", "Progress (%)"];

struct Text {
    font: &'static str,
    size: u32,
    x: i32,
    y: i32,
    value: String,
}

/// Escape a string for a PDF literal; non-ASCII becomes `?`.
fn pdf_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

fn header_row(y: i32) -> Vec<Text> {
    HEADERS
        .iter()
        .zip(COLUMNS)
        .map(|(header, x)| Text {
            font: "F2",
            size: 10,
            x,
            y,
            value: header.to_string(),
        })
        .collect()
}

fn layout(title: &str, derived: &Derived, tasks: &[EffectiveTask]) -> Vec<Vec<Text>> {
    let completed = tasks
        .iter()
        .filter(|task| derived.status(task) == TaskStatus::Completed)
        .count();

    let mut pages = Vec::new();
    let mut page = vec![
        Text {
            font: "F2",
            size: 18,
            x: MARGIN_LEFT,
            y: TITLE_Y,
            value: title.to_string(),
        },
        Text {
            font: "F1",
            size: 11,
            x: MARGIN_LEFT,
            y: SUMMARY_Y,
            value: format!(
                "Reference date: {}    Completed: {} / {}",
                derived.reference.format("%Y-%m-%d"),
                completed,
                tasks.len()
            ),
        },
    ];
    page.extend(header_row(FIRST_HEADER_Y));
    let mut y = FIRST_HEADER_Y - ROW_HEIGHT;

    for task in tasks {
        if y < PAGE_BOTTOM {
            pages.push(std::mem::take(&mut page));
            page.extend(header_row(TITLE_Y));
            y = TITLE_Y - ROW_HEIGHT;
        }
        let cells = [
            truncate(&task.label, MAX_LABEL_CHARS),
            task.start.format("%Y-%m-%d").to_string(),
            task.end.format("%Y-%m-%d").to_string(),
            task.length.to_string(),
            task.owner.clone(),
            format!("{}%", derived.percent(&task.id)),
        ];
        for (value, x) in cells.into_iter().zip(COLUMNS) {
            page.push(Text {
                font: "F1",
                size: 10,
                x,
                y,
                value,
            });
        }
        y -= ROW_HEIGHT;
    }
    pages.push(page);
    pages
}

fn content_stream(texts: &[Text]) -> String {
    let mut stream = String::new();
    for text in texts {
        let _ = writeln!(
            stream,
            "BT /{} {} Tf {} {} Td ({}) Tj ET",
            text.font,
            text.size,
            text.x,
            text.y,
            pdf_escape(&text.value)
        );
    }
    stream
}

/// Render the report; `generated` is stamped into the document info.
pub fn render_pdf(title: &str, derived: &Derived, tasks: &[EffectiveTask], generated: NaiveDate) -> Vec<u8> {
    let pages = layout(title, derived, tasks);

    // 1 catalog, 2 pages, 3-4 fonts, 5 info, then (page, content) pairs.
    let first_page_obj = 6;
    let mut objects: Vec<String> = Vec::new();
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", first_page_obj + 2 * i))
        .collect();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string());
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>".to_string());
    objects.push(format!(
        "<< /Title ({}) /CreationDate (D:{}) /Producer (rollout) >>",
        pdf_escape(title),
        generated.format("%Y%m%d")
    ));

    for (index, texts) in pages.iter().enumerate() {
        let content_obj = first_page_obj + 2 * index + 1;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {content_obj} 0 R >>"
        ));
        let stream = content_stream(texts);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            stream.len(),
            stream
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{}\nendobj\n", index + 1, body);
    }

    let xref_offset = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = writeln!(out, "{offset:010} 00000 n ");
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    );
    out.into_bytes()
}
