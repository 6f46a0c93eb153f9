//! Configuration types deserialized from `rvtb.toml`.

use rvtb_common::Timescale;
use serde::Deserialize;
use std::path::PathBuf;

/// Tick horizon of the reference configuration.
pub const DEFAULT_HORIZON: u64 = 40010;

/// Trace file written when no path is configured.
pub const DEFAULT_TRACE_PATH: &str = "rv32im_top_tb.vcd";

/// Hierarchy depth requested by the reference harness.
pub const DEFAULT_TRACE_DEPTH: u32 = 99;

/// The top-level harness configuration parsed from `rvtb.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Run-length and stimulus settings.
    #[serde(default)]
    pub harness: HarnessSection,
    /// Waveform trace settings.
    #[serde(default)]
    pub trace: TraceSection,
}

/// The `[harness]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessSection {
    /// Maximum number of ticks before the run is force-terminated.
    pub horizon: u64,
    /// Reset is held asserted while `tick < reset_release_tick`.
    pub reset_release_tick: u64,
    /// Clock level before the first toggle. The clock is toggled before the
    /// first evaluation, so tick 0 sees the complement of this level.
    pub initial_clock: bool,
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            reset_release_tick: 1,
            initial_clock: false,
        }
    }
}

/// The `[trace]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TraceSection {
    /// Whether a trace file is written at all.
    pub enabled: bool,
    /// Output path. A `.gz` suffix selects gzip-compressed VCD.
    pub path: PathBuf,
    /// Number of hierarchy levels recorded below the top scope; 0 means all.
    pub depth: u32,
    /// Duration of one tick in the trace header.
    pub timescale: Timescale,
}

impl Default for TraceSection {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from(DEFAULT_TRACE_PATH),
            depth: DEFAULT_TRACE_DEPTH,
            timescale: Timescale::default(),
        }
    }
}
