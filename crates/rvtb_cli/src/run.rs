//! `rvtb run`: execute one harness run against the built-in model.
//!
//! Loads `rvtb.toml` (explicit `--config`, else the current directory, else
//! defaults), applies command-line overrides, builds the model from the
//! passthrough plusargs, and runs it to completion or the horizon.

use std::path::Path;

use rvtb_config::{ConfigError, HarnessConfig, CONFIG_FILE_NAME};
use rvtb_sim::{
    run_with_trace, CycleCounter, HarnessOptions, Plusargs, RunSummary, Termination, TraceOptions,
};

use crate::{GlobalArgs, ReportFormat, RunArgs};

/// Exit status for a run cut off by the horizon under `--fail-on-timeout`.
pub const TIMEOUT_EXIT_CODE: i32 = 2;

/// Runs the `rvtb run` command.
///
/// Returns exit code 0 on either termination path, or
/// [`TIMEOUT_EXIT_CODE`] when `--fail-on-timeout` is set and the horizon was
/// reached. Any error (including a trace that cannot be created) is returned.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_effective_config(global.config.as_deref(), Path::new("."))?;
    let config = apply_overrides(config, args)?;

    let options = HarnessOptions::from_config(&config.harness);
    let trace = TraceOptions::from_config(&config.trace);

    let plusargs = Plusargs::parse(&args.plusargs);
    let uut = CycleCounter::from_plusargs(&plusargs)?;

    let summary = run_with_trace(uut, trace.as_ref(), options)?;

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        ReportFormat::Text if !global.quiet => {
            println!("{}", describe(&summary));
            if let Some(trace) = &trace {
                println!("trace written to {}", trace.path.display());
            }
        }
        ReportFormat::Text => {}
    }

    Ok(exit_code(&summary, args.fail_on_timeout))
}

/// Loads the configuration file that applies to this invocation.
///
/// An explicit path must exist. Without one, `<dir>/rvtb.toml` is used if
/// present and the built-in defaults otherwise.
fn load_effective_config(explicit: Option<&str>, dir: &Path) -> Result<HarnessConfig, ConfigError> {
    match explicit {
        Some(path) => rvtb_config::load_config_file(Path::new(path)),
        None if dir.join(CONFIG_FILE_NAME).is_file() => rvtb_config::load_config(dir),
        None => Ok(HarnessConfig::default()),
    }
}

/// Applies command-line overrides and re-validates the result.
fn apply_overrides(mut config: HarnessConfig, args: &RunArgs) -> Result<HarnessConfig, ConfigError> {
    if let Some(horizon) = args.horizon {
        config.harness.horizon = horizon;
    }
    if let Some(path) = &args.trace {
        config.trace.enabled = true;
        config.trace.path = path.into();
    }
    if args.no_trace {
        config.trace.enabled = false;
    }
    if let Some(depth) = args.trace_depth {
        config.trace.depth = depth;
    }
    if let Some(timescale) = args.timescale {
        config.trace.timescale = timescale;
    }
    rvtb_config::validate_config(&config)?;
    Ok(config)
}

fn exit_code(summary: &RunSummary, fail_on_timeout: bool) -> i32 {
    if fail_on_timeout && summary.is_timeout() {
        TIMEOUT_EXIT_CODE
    } else {
        0
    }
}

fn describe(summary: &RunSummary) -> String {
    match summary.termination {
        Termination::Finished => format!("finished after {} ticks", summary.ticks),
        Termination::HorizonReached => {
            format!("horizon reached after {} ticks without finishing", summary.ticks)
        }
    }
}
