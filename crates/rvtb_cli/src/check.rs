//! `rvtb check`: verify the record sequence of a recorded trace.

use std::path::Path;

use rvtb_sim::{check_trace_file, TraceSummary};
use tracing::debug;

use crate::{CheckArgs, GlobalArgs, ReportFormat};

/// Runs the `rvtb check` command.
///
/// Returns exit code 0 when the trace is well formed; a malformed or
/// unreadable trace is returned as an error.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let path = Path::new(&args.trace);
    debug!(path = %path.display(), "checking trace");
    let summary = check_trace_file(path)?;

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        ReportFormat::Text if !global.quiet => println!("{}: {}", path.display(), describe(&summary)),
        ReportFormat::Text => {}
    }
    Ok(0)
}

fn describe(summary: &TraceSummary) -> String {
    format!(
        "ok, {} signals, {} records (ticks {}..={})",
        summary.signals, summary.records, summary.first_tick, summary.last_tick
    )
}
