//! Clock and reset stimulus policies.
//!
//! Both are pure functions of the tick index plus a small amount of
//! loop-local state, so a run can be replayed exactly.

use rvtb_common::Tick;

/// Free-running clock that toggles once per tick.
///
/// The clock is toggled *before* each evaluation, starting from
/// `initial`, so tick 0 sees `!initial`, tick 1 sees `initial`, and so on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockDriver {
    initial: bool,
}

impl ClockDriver {
    /// Creates a clock whose pre-run level is `initial`.
    pub fn new(initial: bool) -> Self {
        Self { initial }
    }

    /// The pre-run level.
    pub fn initial(&self) -> bool {
        self.initial
    }

    /// The level applied at `tick`.
    pub fn level(&self, tick: Tick) -> bool {
        if tick.is_odd() {
            self.initial
        } else {
            !self.initial
        }
    }
}

/// One-shot reset: asserted while `tick < release_tick`, then never again.
///
/// The sequencer latches the release. Once it has reported reset as
/// deasserted it keeps doing so for the rest of the run, whatever tick it is
/// asked about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetSequencer {
    release_tick: Tick,
    released: bool,
}

impl ResetSequencer {
    /// Creates a sequencer that releases reset at `release_tick`.
    pub fn new(release_tick: u64) -> Self {
        Self {
            release_tick: Tick::new(release_tick),
            released: false,
        }
    }

    /// The first tick at which reset is deasserted.
    pub fn release_tick(&self) -> Tick {
        self.release_tick
    }

    /// True once reset has been released.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Whether reset is asserted at `tick`.
    pub fn asserted(&mut self, tick: Tick) -> bool {
        if self.released {
            return false;
        }
        if tick < self.release_tick {
            true
        } else {
            self.released = true;
            false
        }
    }
}

impl Default for ResetSequencer {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_clock_is_high_on_tick_zero() {
        let clk = ClockDriver::default();
        assert!(clk.level(Tick::ZERO));
        assert!(!clk.level(Tick::new(1)));
        assert!(clk.level(Tick::new(2)));
    }

    #[test]
    fn initial_high_clock_starts_low() {
        let clk = ClockDriver::new(true);
        assert!(!clk.level(Tick::ZERO));
        assert!(clk.level(Tick::new(1)));
    }

    #[test]
    fn default_reset_covers_only_tick_zero() {
        let mut rst = ResetSequencer::default();
        assert!(rst.asserted(Tick::ZERO));
        assert!(!rst.is_released());
        assert!(!rst.asserted(Tick::new(1)));
        assert!(rst.is_released());
        assert!(!rst.asserted(Tick::new(2)));
    }

    #[test]
    fn released_reset_never_reasserts() {
        let mut rst = ResetSequencer::new(3);
        assert!(rst.asserted(Tick::new(2)));
        assert!(!rst.asserted(Tick::new(3)));
        // Asking about an earlier tick after release must not flip it back.
        assert!(!rst.asserted(Tick::new(0)));
    }

    #[test]
    fn zero_release_tick_never_asserts() {
        let mut rst = ResetSequencer::new(0);
        assert!(!rst.asserted(Tick::ZERO));
    }

    proptest! {
        #[test]
        fn clock_strictly_alternates(initial: bool, t in 1u64..1_000_000) {
            let clk = ClockDriver::new(initial);
            prop_assert_ne!(clk.level(Tick::new(t)), clk.level(Tick::new(t - 1)));
        }

        #[test]
        fn reset_is_monotone(release in 0u64..64, ticks in 1u64..256) {
            let mut rst = ResetSequencer::new(release);
            let mut seen_release = false;
            for t in 0..ticks {
                let asserted = rst.asserted(Tick::new(t));
                prop_assert_eq!(asserted, t < release);
                if seen_release {
                    prop_assert!(!asserted);
                }
                seen_release |= !asserted;
            }
        }
    }
}
