//! rvtb CLI: drives an RV32IM model through the simulation harness.
//!
//! Provides `rvtb run` to execute a clock/reset run against the built-in
//! model with an optional VCD trace, and `rvtb check` to verify that a
//! recorded trace contains one record per tick.

#![warn(missing_docs)]

mod check;
mod run;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use rvtb_common::Timescale;

/// rvtb: deterministic clock/reset harness for RV32IM processor models.
#[derive(Parser, Debug)]
#[command(name = "rvtb", version, about = "RV32IM simulation harness")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Path to a custom `rvtb.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the built-in model until it finishes or the horizon is reached.
    Run(RunArgs),
    /// Check that a VCD trace has one record per tick.
    Check(CheckArgs),
}

/// Arguments for the `rvtb run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Maximum number of ticks to execute.
    #[arg(long)]
    pub horizon: Option<u64>,

    /// Output path for the VCD trace (`.gz` selects gzip).
    #[arg(long, conflicts_with = "no_trace")]
    pub trace: Option<String>,

    /// Disable trace recording.
    #[arg(long)]
    pub no_trace: bool,

    /// Hierarchy levels to record (0 = all).
    #[arg(long)]
    pub trace_depth: Option<u32>,

    /// Tick duration written into the trace header (e.g. "1ps", "10ns").
    #[arg(long)]
    pub timescale: Option<Timescale>,

    /// Exit with status 2 when the horizon is reached before the model finishes.
    #[arg(long)]
    pub fail_on_timeout: bool,

    /// Output format for the run summary.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Model arguments in `+name` or `+name=value` form.
    #[arg(value_parser = parse_plusarg)]
    pub plusargs: Vec<String>,
}

/// Accepts only `+`-prefixed model arguments.
fn parse_plusarg(arg: &str) -> Result<String, String> {
    if arg.starts_with('+') {
        Ok(arg.to_string())
    } else {
        Err(format!("model arguments must start with '+' (got '{arg}')"))
    }
}

/// Arguments for the `rvtb check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Trace file to check (`.gz` files are decompressed).
    pub trace: String,

    /// Output format for the check summary.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Summary output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Default log filter for the global verbosity flags.
fn default_filter(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "info"
    }
}

/// Installs the `tracing` subscriber. `RUST_LOG` overrides the flags.
fn init_logging(global: &GlobalArgs) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(global)));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
