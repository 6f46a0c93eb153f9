//! Built-in models for running the harness without an external processor.

use rvtb_common::SignalValue;

use crate::error::HarnessError;
use crate::plusargs::Plusargs;
use crate::uut::{SignalDecl, Uut};

/// Address the program counter takes while reset is held.
pub const RESET_VECTOR: u32 = 0;

/// Plusarg read by [`CycleCounter::from_plusargs`].
pub const FINISH_AFTER_PLUSARG: &str = "finish_after";

/// A synchronous cycle counter standing in for the processor top level.
///
/// On every rising clock edge it clears its counter (and parks the program
/// counter at [`RESET_VECTOR`]) while reset is high, otherwise it counts one
/// cycle and advances the program counter by one instruction. It raises
/// `finished` once the counter reaches the configured limit.
///
/// Registers read as `X` until the first edge under reset.
#[derive(Debug)]
pub struct CycleCounter {
    name: String,
    clk: bool,
    reset: bool,
    prev_clk: bool,
    cycle: Option<u32>,
    pc: Option<u32>,
    finish_after: Option<u32>,
    finished: bool,
}

impl CycleCounter {
    /// Creates a counter that finishes after `finish_after` cycles, or never.
    pub fn new(finish_after: Option<u32>) -> Self {
        Self {
            name: "rv32im_top".to_string(),
            clk: false,
            reset: false,
            prev_clk: false,
            cycle: None,
            pc: None,
            finish_after,
            finished: false,
        }
    }

    /// Creates a counter configured by `+finish_after=N`.
    pub fn from_plusargs(plusargs: &Plusargs) -> Result<Self, HarnessError> {
        let finish_after = plusargs.parse_value::<u32>(FINISH_AFTER_PLUSARG)?;
        Ok(Self::new(finish_after))
    }

    /// Cycles counted since reset was released, or `None` before the first reset edge.
    pub fn cycle(&self) -> Option<u32> {
        self.cycle
    }

    /// Current program counter, or `None` before the first reset edge.
    pub fn pc(&self) -> Option<u32> {
        self.pc
    }

    fn on_rising_edge(&mut self) {
        if self.reset {
            self.cycle = Some(0);
            self.pc = Some(RESET_VECTOR);
        } else {
            self.cycle = self.cycle.map(|c| c.wrapping_add(1));
            self.pc = self.pc.map(|pc| pc.wrapping_add(4));
        }
    }
}

impl Default for CycleCounter {
    fn default() -> Self {
        Self::new(None)
    }
}

fn word(value: Option<u32>) -> SignalValue {
    value.map_or_else(SignalValue::unknown_word, SignalValue::from_u32)
}

impl Uut for CycleCounter {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_clock(&mut self, level: bool) {
        self.clk = level;
    }

    fn set_reset(&mut self, level: bool) {
        self.reset = level;
    }

    fn evaluate(&mut self) {
        if self.clk && !self.prev_clk {
            self.on_rising_edge();
        }
        self.prev_clk = self.clk;

        if let (Some(limit), Some(cycle)) = (self.finish_after, self.cycle) {
            if cycle >= limit {
                self.finished = true;
            }
        }
    }

    fn finished(&self) -> bool {
        self.finished
    }

    fn signals(&self) -> Vec<SignalDecl> {
        vec![
            SignalDecl::new("clk", 1),
            SignalDecl::new("reset", 1),
            SignalDecl::new("cycle", 32),
            SignalDecl::new("finished", 1),
            SignalDecl::scoped(["core"], "pc", 32),
        ]
    }

    fn sample(&self, out: &mut Vec<SignalValue>) {
        out.push(SignalValue::from_bool(self.clk));
        out.push(SignalValue::from_bool(self.reset));
        out.push(word(self.cycle));
        out.push(SignalValue::from_bool(self.finished));
        out.push(word(self.pc));
    }
}
