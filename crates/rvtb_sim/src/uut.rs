//! The unit-under-test boundary.
//!
//! The harness never looks inside the processor model. Everything it needs
//! is the [`Uut`] capability set: two input pins, a single-step evaluate, a
//! completion flag, and a way to enumerate and sample observable signals for
//! the trace.

use rvtb_common::SignalValue;

/// An observable signal exposed by a model for tracing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalDecl {
    /// Scope path below the model's top scope (empty for top-level signals).
    pub scope: Vec<String>,
    /// Signal name within its scope.
    pub name: String,
    /// Bit width (1..=64).
    pub width: u32,
}

impl SignalDecl {
    /// Declares a signal in the top scope.
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        Self {
            scope: Vec::new(),
            name: name.into(),
            width,
        }
    }

    /// Declares a signal nested under `scope` (outermost first).
    pub fn scoped<I, S>(scope: I, name: impl Into<String>, width: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scope: scope.into_iter().map(Into::into).collect(),
            name: name.into(),
            width,
        }
    }

    /// Hierarchy level of the signal: 1 for top-scope signals, 2 for one
    /// level down, and so on.
    pub fn level(&self) -> u32 {
        self.scope.len() as u32 + 1
    }
}

/// A cycle-stepped hardware model driven by the harness.
///
/// Implementations are owned by the harness for the duration of a run and
/// released by dropping them. The harness always calls
/// [`set_clock`](Uut::set_clock) then [`set_reset`](Uut::set_reset) before
/// each [`evaluate`](Uut::evaluate).
pub trait Uut {
    /// Name of the model's top scope in the trace.
    fn name(&self) -> &str;

    /// Drives the clock input.
    fn set_clock(&mut self, level: bool);

    /// Drives the reset input.
    fn set_reset(&mut self, level: bool);

    /// Advances the model by one delta-cycle using the current inputs.
    fn evaluate(&mut self);

    /// True once the modeled program has signalled completion.
    fn finished(&self) -> bool;

    /// Declares the observable signals. Must be stable for the model's lifetime.
    fn signals(&self) -> Vec<SignalDecl>;

    /// Appends the current value of every declared signal, in declaration order.
    fn sample(&self, out: &mut Vec<SignalValue>);
}

impl<U: Uut + ?Sized> Uut for Box<U> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn set_clock(&mut self, level: bool) {
        (**self).set_clock(level)
    }

    fn set_reset(&mut self, level: bool) {
        (**self).set_reset(level)
    }

    fn evaluate(&mut self) {
        (**self).evaluate()
    }

    fn finished(&self) -> bool {
        (**self).finished()
    }

    fn signals(&self) -> Vec<SignalDecl> {
        (**self).signals()
    }

    fn sample(&self, out: &mut Vec<SignalValue>) {
        (**self).sample(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_signal_is_level_one() {
        let d = SignalDecl::new("clk", 1);
        assert!(d.scope.is_empty());
        assert_eq!(d.level(), 1);
    }

    #[test]
    fn scoped_signal_levels() {
        let d = SignalDecl::scoped(["core", "alu"], "result", 32);
        assert_eq!(d.scope, vec!["core".to_string(), "alu".to_string()]);
        assert_eq!(d.level(), 3);
        assert_eq!(d.width, 32);
    }
}
