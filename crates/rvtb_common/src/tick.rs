//! The simulation tick counter.
//!
//! A [`Tick`] is one delta-step of the harness: the clock level changes
//! exactly once per tick, so a full clock period spans two ticks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A zero-based simulation step index.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Tick(u64);

impl Tick {
    /// The first tick of every run.
    pub const ZERO: Tick = Tick(0);

    /// Creates a tick from a raw step index.
    pub fn new(index: u64) -> Self {
        Self(index)
    }

    /// Returns the raw step index.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the following tick.
    ///
    /// The harness never advances past its horizon, so this cannot overflow
    /// in practice; an overflow is a logic error and panics.
    pub fn next(self) -> Self {
        match self.0.checked_add(1) {
            Some(n) => Self(n),
            None => panic!("tick counter overflow"),
        }
    }

    /// Returns true for odd ticks (the second half of each clock period).
    pub fn is_odd(self) -> bool {
        self.0 % 2 == 1
    }
}

impl From<u64> for Tick {
    fn from(index: u64) -> Self {
        Self(index)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
