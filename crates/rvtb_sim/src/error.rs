//! Error types for the simulation harness.
//!
//! All failures that can occur while setting up or driving a run are
//! variants of [`HarnessError`]. Running out of ticks is not an error; it is
//! reported through [`Termination::HorizonReached`](crate::Termination).

use std::io;
use std::path::PathBuf;

use rvtb_common::{Tick, ValueError};
use rvtb_config::ConfigError;

use crate::plusargs::PlusargError;

/// Errors that can occur during harness setup or execution.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The trace file could not be created.
    #[error("cannot open trace file {}: {source}", .path.display())]
    TraceOpen {
        /// The path that was requested.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Writing or flushing trace data failed.
    #[error("trace I/O error: {0}")]
    TraceIo(#[from] io::Error),

    /// A trace record arrived out of tick order.
    #[error("trace record out of order: expected tick {expected}, got {got}")]
    TraceOrder {
        /// The tick the sink was waiting for.
        expected: Tick,
        /// The tick that was offered.
        got: Tick,
    },

    /// Snapshots were recorded before the signal set was declared.
    #[error("trace signals were not declared before the first record")]
    TraceNotDeclared,

    /// The signal set was declared a second time.
    #[error("trace signals were already declared")]
    TraceAlreadyDeclared,

    /// The trace sink was used after it had been closed.
    #[error("trace sink is closed")]
    TraceClosed,

    /// The model sampled a different number of values than it declared.
    #[error("model sampled {sampled} values but declared {declared} signals")]
    SampleMismatch {
        /// Number of declared signals.
        declared: usize,
        /// Number of sampled values.
        sampled: usize,
    },

    /// A declared signal has an unusable width.
    #[error("signal '{name}': {source}")]
    InvalidSignal {
        /// Signal name.
        name: String,
        /// Why the width was rejected.
        #[source]
        source: ValueError,
    },

    /// The harness configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A model could not be configured from its plusargs.
    #[error(transparent)]
    Plusarg(#[from] PlusargError),
}
