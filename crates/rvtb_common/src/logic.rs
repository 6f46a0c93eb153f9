//! Four-state logic bits as seen by a waveform viewer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

/// A single 4-state logic bit.
///
/// Two-state models only ever produce `Zero` and `One`; `X` marks a signal
/// that has not been driven yet (before the first evaluation) and `Z` is
/// kept so externally supplied 4-state models can be traced faithfully.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown or uninitialized.
    X = 2,
    /// High-impedance.
    Z = 3,
}

impl Logic {
    /// Converts a boolean level into a driven logic bit.
    pub fn from_bool(level: bool) -> Self {
        if level {
            Logic::One
        } else {
            Logic::Zero
        }
    }

    /// Converts a VCD value character to a [`Logic`] value.
    ///
    /// Accepts '0', '1', 'x'/'X', and 'z'/'Z'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            'z' | 'Z' => Some(Logic::Z),
            _ => None,
        }
    }

    /// The character used for this bit in a VCD value change.
    pub fn vcd_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'x',
            Logic::Z => 'z',
        }
    }

    /// Returns `Some(level)` for driven bits and `None` for `X`/`Z`.
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Logic::Zero => Some(false),
            Logic::One => Some(true),
            Logic::X | Logic::Z => None,
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Zero => write!(f, "0"),
            Logic::One => write!(f, "1"),
            Logic::X => write!(f, "X"),
            Logic::Z => write!(f, "Z"),
        }
    }
}

/// `!0 = 1`, `!1 = 0`, `!X = X`, `!Z = X`
impl Not for Logic {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Logic::Zero => Logic::One,
            Logic::One => Logic::Zero,
            Logic::X | Logic::Z => Logic::X,
        }
    }
}
