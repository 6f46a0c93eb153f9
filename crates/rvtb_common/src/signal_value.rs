//! Packed signal values of up to 64 bits.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Widest signal a [`SignalValue`] can hold.
pub const MAX_WIDTH: u32 = 64;

/// Errors produced when constructing signal values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The requested width is zero or larger than [`MAX_WIDTH`].
    #[error("invalid signal width {0} (expected 1..=64)")]
    InvalidWidth(u32),
}

/// A fixed-width vector of 4-state bits.
///
/// Stored as two planes: `unknown` marks bits that are `X` or `Z`, and for
/// those bits `bits` selects `Z` (1) over `X` (0). For known bits `bits` is
/// the driven level. Bits above `width` are always zero in both planes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalValue {
    width: u32,
    bits: u64,
    unknown: u64,
}

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

fn check_width(width: u32) -> Result<(), ValueError> {
    if width == 0 || width > MAX_WIDTH {
        Err(ValueError::InvalidWidth(width))
    } else {
        Ok(())
    }
}

impl SignalValue {
    /// Creates an all-`X` value, the state of a signal before it is driven.
    pub fn new_unknown(width: u32) -> Result<Self, ValueError> {
        check_width(width)?;
        Ok(Self {
            width,
            bits: 0,
            unknown: mask(width),
        })
    }

    /// Creates a fully driven value. Bits of `value` above `width` are dropped.
    pub fn from_u64(value: u64, width: u32) -> Result<Self, ValueError> {
        check_width(width)?;
        Ok(Self {
            width,
            bits: value & mask(width),
            unknown: 0,
        })
    }

    /// Creates a driven single-bit value.
    pub fn from_bool(level: bool) -> Self {
        Self {
            width: 1,
            bits: u64::from(level),
            unknown: 0,
        }
    }

    /// Creates a driven 32-bit value.
    pub fn from_u32(value: u32) -> Self {
        Self {
            width: 32,
            bits: u64::from(value),
            unknown: 0,
        }
    }

    /// Creates an all-`X` 32-bit value.
    pub fn unknown_word() -> Self {
        Self {
            width: 32,
            bits: 0,
            unknown: mask(32),
        }
    }

    /// Number of bits in this value.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let b = (self.bits >> index) & 1;
        let u = (self.unknown >> index) & 1;
        match (u, b) {
            (0, 0) => Logic::Zero,
            (0, _) => Logic::One,
            (_, 0) => Logic::X,
            _ => Logic::Z,
        }
    }

    /// Sets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let bit = 1u64 << index;
        let (u, b) = match value {
            Logic::Zero => (false, false),
            Logic::One => (false, true),
            Logic::X => (true, false),
            Logic::Z => (true, true),
        };
        self.unknown = if u { self.unknown | bit } else { self.unknown & !bit };
        self.bits = if b { self.bits | bit } else { self.bits & !bit };
    }

    /// Returns the numeric value if every bit is driven.
    pub fn to_u64(&self) -> Option<u64> {
        if self.unknown == 0 {
            Some(self.bits)
        } else {
            None
        }
    }

    /// Returns true if any bit is `X` or `Z`.
    pub fn has_unknown(&self) -> bool {
        self.unknown != 0
    }

    /// Renders the value the way it appears in a VCD value change.
    ///
    /// Single-bit values are a bare character (`1`); vectors are `b` followed
    /// by every bit, most significant first (`b0101`).
    pub fn vcd_string(&self) -> String {
        if self.width == 1 {
            return self.get(0).vcd_char().to_string();
        }
        let mut s = String::with_capacity(self.width as usize + 1);
        s.push('b');
        for i in (0..self.width).rev() {
            s.push(self.get(i).vcd_char());
        }
        s
    }
}

impl fmt::Debug for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignalValue({}'", self.width)?;
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        write!(f, ")")
    }
}
