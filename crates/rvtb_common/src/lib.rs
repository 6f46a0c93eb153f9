//! Shared foundational types used across the rvtb simulation harness.
//!
//! This crate provides 4-state logic values, packed signal values, the
//! simulation tick counter, and the timescale used to annotate traces.

#![warn(missing_docs)]

pub mod logic;
pub mod signal_value;
pub mod tick;
pub mod timescale;

pub use logic::Logic;
pub use signal_value::{SignalValue, ValueError};
pub use tick::Tick;
pub use timescale::{ParseTimescaleError, Timescale, TimeUnit};
