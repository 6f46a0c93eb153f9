//! Deterministic clock/reset harness for cycle-stepped RV32IM processor models.
//!
//! The harness owns a model implementing [`Uut`], toggles its clock once per
//! tick, holds reset for the first tick(s), evaluates the model exactly once
//! per tick, and records every tick's signal snapshot to a [`TraceSink`]. A
//! run ends when the model raises its `finished` flag or when the tick
//! horizon (40010 by default) is reached, whichever happens first.
//!
//! # Usage
//!
//! ```ignore
//! use rvtb_sim::{run_with_trace, CycleCounter, HarnessOptions, TraceOptions};
//!
//! let uut = CycleCounter::new(Some(100));
//! let trace = TraceOptions::new("rv32im_top_tb.vcd");
//! let summary = run_with_trace(uut, Some(&trace), HarnessOptions::default())?;
//! println!("{} ticks, {:?}", summary.ticks, summary.termination);
//! ```
//!
//! # Modules
//!
//! - `uut`: the model boundary
//! - `policy`: clock and reset stimulus
//! - `trace`: VCD output and trace checking
//! - `harness`: the tick loop
//! - `plusargs`: `+name=value` passthrough arguments
//! - `models`: a built-in reference model

#![warn(missing_docs)]

pub mod error;
pub mod harness;
pub mod models;
pub mod plusargs;
pub mod policy;
pub mod trace;
pub mod uut;

pub use error::HarnessError;
pub use harness::{run_with_trace, Harness, HarnessOptions, HarnessState, RunSummary, Termination};
pub use models::CycleCounter;
pub use plusargs::{PlusargError, Plusargs};
pub use policy::{ClockDriver, ResetSequencer};
pub use trace::{
    check_trace, check_trace_file, open_trace, NullTrace, TraceCheckError, TraceFile,
    TraceOptions, TraceSink, TraceSummary, TraceWrite, VcdTrace,
};
pub use uut::{SignalDecl, Uut};
