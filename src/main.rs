//! rollout - brand rebuild plan tracker
//!
//! A standalone CLI that tracks a rollout plan as a timeline of tasks with
//! weighted subtask progress, local overrides, and CSV/PDF export.

use clap::Parser;
use rollout::cli::Cli;
use rollout::output::{emit_error, infer_command_name_from_args};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let command = infer_command_name_from_args();
    let cli = Cli::parse();

    // RUST_LOG wins; --verbose falls back to debug for this crate only.
    // Ignore invalid/huge filters so startup never fails on logging.
    let fallback = if cli.verbose { "rollout=debug" } else { "off" };
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
