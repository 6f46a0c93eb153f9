//! The simulation driving loop.
//!
//! [`Harness`] owns the model and the trace sink for the duration of a run.
//! Each tick it applies the clock, then reset, evaluates the model once,
//! records the resulting snapshot, and advances the tick counter. The loop
//! stops when the model reports `finished` (checked after the tick has been
//! fully recorded) or when the tick counter reaches the horizon.
//!
//! ```text
//! Init ──declare──▶ Running ──finished / horizon / error──▶ Stopped
//! ```

use rvtb_common::{SignalValue, Tick};
use rvtb_config::{HarnessSection, DEFAULT_HORIZON};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::error::HarnessError;
use crate::policy::{ClockDriver, ResetSequencer};
use crate::trace::{open_trace, NullTrace, TraceOptions, TraceSink};
use crate::uut::Uut;

/// Run-length and stimulus settings for one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HarnessOptions {
    /// Maximum number of ticks to execute.
    pub horizon: u64,
    /// Clock stimulus.
    pub clock: ClockDriver,
    /// Reset stimulus.
    pub reset: ResetSequencer,
}

impl HarnessOptions {
    /// Options with the given horizon and default stimulus.
    pub fn with_horizon(horizon: u64) -> Self {
        Self {
            horizon,
            ..Self::default()
        }
    }

    /// Builds options from a validated `[harness]` section.
    pub fn from_config(section: &HarnessSection) -> Self {
        Self {
            horizon: section.horizon,
            clock: ClockDriver::new(section.initial_clock),
            reset: ResetSequencer::new(section.reset_release_tick),
        }
    }
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            clock: ClockDriver::default(),
            reset: ResetSequencer::default(),
        }
    }
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The model raised its `finished` flag.
    Finished,
    /// The tick counter reached the horizon first.
    HorizonReached,
}

/// The outcome of a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of ticks executed (and recorded).
    pub ticks: u64,
    /// Which termination condition fired.
    pub termination: Termination,
}

impl RunSummary {
    /// True if the run was cut off by the horizon rather than finishing.
    pub fn is_timeout(&self) -> bool {
        self.termination == Termination::HorizonReached
    }

    /// The last tick that was executed, if any.
    pub fn last_tick(&self) -> Option<Tick> {
        self.ticks.checked_sub(1).map(Tick::new)
    }
}

/// Lifecycle stage of a [`Harness`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HarnessState {
    /// Constructed; nothing has been declared or evaluated yet.
    Init,
    /// Ticks are being executed.
    Running,
    /// The sink has been closed. Terminal.
    Stopped,
}

/// Drives a [`Uut`] through clock/reset stimulus into a [`TraceSink`].
pub struct Harness<U: Uut, S: TraceSink> {
    uut: U,
    sink: S,
    options: HarnessOptions,
    state: HarnessState,
    tick: Tick,
    values: Vec<SignalValue>,
}

impl<U: Uut, S: TraceSink> Harness<U, S> {
    /// Takes ownership of the model and an already-open sink.
    pub fn new(uut: U, sink: S, options: HarnessOptions) -> Self {
        Self {
            uut,
            sink,
            options,
            state: HarnessState::Init,
            tick: Tick::ZERO,
            values: Vec::new(),
        }
    }

    /// The current lifecycle stage.
    pub fn state(&self) -> HarnessState {
        self.state
    }

    /// Executes the run and releases the model and sink.
    ///
    /// The sink is closed exactly once whichever way the run ends. If both
    /// the run and the close fail, the run's error is returned and the close
    /// failure is logged.
    pub fn run(mut self) -> Result<RunSummary, HarnessError> {
        let span = info_span!("harness", uut = self.uut.name(), horizon = self.options.horizon);
        let _guard = span.enter();

        let outcome = self.drive();
        self.state = HarnessState::Stopped;
        let closed = self.sink.close();

        match (outcome, closed) {
            (Ok(summary), Ok(())) => {
                info!(
                    ticks = summary.ticks,
                    termination = ?summary.termination,
                    "simulation stopped"
                );
                Ok(summary)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => {
                warn!(tick = %self.tick, error = %e, "simulation aborted");
                Err(e)
            }
            (Err(e), Err(close_err)) => {
                warn!(tick = %self.tick, error = %e, %close_err, "simulation aborted; trace close also failed");
                Err(e)
            }
        }
    }

    fn drive(&mut self) -> Result<RunSummary, HarnessError> {
        let signals = self.uut.signals();
        self.sink.declare(self.uut.name(), &signals)?;

        let clock = self.options.clock;
        let mut reset = self.options.reset;
        let horizon = self.options.horizon;

        self.state = HarnessState::Running;
        info!(signals = signals.len(), "simulation running");

        while self.tick.as_u64() < horizon && !self.uut.finished() {
            let tick = self.tick;
            self.uut.set_clock(clock.level(tick));
            let was_released = reset.is_released();
            self.uut.set_reset(reset.asserted(tick));
            if reset.is_released() && !was_released {
                debug!(%tick, "reset released");
            }
            self.uut.evaluate();

            self.values.clear();
            self.uut.sample(&mut self.values);
            self.sink.record(tick, &self.values)?;
            self.tick = tick.next();
        }

        // A model that finishes on the last allowed tick still counts as finished.
        let termination = if self.uut.finished() {
            Termination::Finished
        } else {
            Termination::HorizonReached
        };
        Ok(RunSummary {
            ticks: self.tick.as_u64(),
            termination,
        })
    }
}

/// Runs `uut` with a file trace (or none), opening the trace before the
/// first evaluation.
///
/// A trace that cannot be created aborts the run before any tick executes;
/// the model is still released.
pub fn run_with_trace<U: Uut>(
    uut: U,
    trace: Option<&TraceOptions>,
    options: HarnessOptions,
) -> Result<RunSummary, HarnessError> {
    match trace {
        Some(trace) => {
            let sink = open_trace(trace)?;
            Harness::new(uut, sink, options).run()
        }
        None => Harness::new(uut, NullTrace::new(), options).run(),
    }
}
