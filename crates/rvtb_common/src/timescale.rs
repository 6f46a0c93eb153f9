//! VCD timescale values with unit parsing and display.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// A time unit accepted in a VCD `$timescale` declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Seconds.
    S,
    /// Milliseconds.
    Ms,
    /// Microseconds.
    Us,
    /// Nanoseconds.
    Ns,
    /// Picoseconds.
    Ps,
    /// Femtoseconds.
    Fs,
}

impl TimeUnit {
    fn suffix(self) -> &'static str {
        match self {
            TimeUnit::S => "s",
            TimeUnit::Ms => "ms",
            TimeUnit::Us => "us",
            TimeUnit::Ns => "ns",
            TimeUnit::Ps => "ps",
            TimeUnit::Fs => "fs",
        }
    }
}

/// The duration of one tick as written into a trace header.
///
/// IEEE 1364 restricts the magnitude to 1, 10, or 100. The default is `1ps`,
/// the unit Verilator-style harnesses use when nothing else is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Timescale {
    magnitude: u16,
    unit: TimeUnit,
}

impl Timescale {
    /// Creates a timescale, rejecting magnitudes other than 1, 10, and 100.
    pub fn new(magnitude: u16, unit: TimeUnit) -> Result<Self, ParseTimescaleError> {
        if !matches!(magnitude, 1 | 10 | 100) {
            return Err(ParseTimescaleError {
                input: format!("{magnitude}{}", unit.suffix()),
                reason: "magnitude must be 1, 10, or 100",
            });
        }
        Ok(Self { magnitude, unit })
    }

    /// The numeric part (1, 10, or 100).
    pub fn magnitude(&self) -> u16 {
        self.magnitude
    }

    /// The unit part.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }
}

impl Default for Timescale {
    fn default() -> Self {
        Self {
            magnitude: 1,
            unit: TimeUnit::Ps,
        }
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}

/// Error type for parsing timescale strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimescaleError {
    /// The input string that failed to parse.
    pub input: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

impl fmt::Display for ParseTimescaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid timescale '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for ParseTimescaleError {}

impl FromStr for Timescale {
    type Err = ParseTimescaleError;

    /// Parses strings like `"1ps"`, `"10 ns"`, or `"100us"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = |reason| ParseTimescaleError {
            input: s.to_string(),
            reason,
        };

        let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        if digit_end == 0 {
            return Err(err("no numeric value"));
        }
        let magnitude: u16 = s[..digit_end].parse().map_err(|_| err("invalid number"))?;

        let unit = match s[digit_end..].trim() {
            "s" => TimeUnit::S,
            "ms" => TimeUnit::Ms,
            "us" => TimeUnit::Us,
            "ns" => TimeUnit::Ns,
            "ps" => TimeUnit::Ps,
            "fs" => TimeUnit::Fs,
            "" => return Err(err("missing unit (use s, ms, us, ns, ps, or fs)")),
            _ => return Err(err("unknown unit (use s, ms, us, ns, ps, or fs)")),
        };

        Timescale::new(magnitude, unit).map_err(|e| err(e.reason))
    }
}

impl<'de> Deserialize<'de> for Timescale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TimescaleVisitor;

        impl Visitor<'_> for TimescaleVisitor {
            type Value = Timescale;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a timescale string such as \"1ps\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimescaleVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_picosecond() {
        assert_eq!(Timescale::default().to_string(), "1ps");
    }

    #[test]
    fn parse_valid() {
        let t: Timescale = "10ns".parse().unwrap();
        assert_eq!(t.magnitude(), 10);
        assert_eq!(t.unit(), TimeUnit::Ns);
        assert_eq!(" 100 us ".parse::<Timescale>().unwrap().to_string(), "100us");
        assert_eq!("1fs".parse::<Timescale>().unwrap().unit(), TimeUnit::Fs);
    }

    #[test]
    fn parse_rejects_bad_magnitude() {
        let err = "5ns".parse::<Timescale>().unwrap_err();
        assert!(err.to_string().contains("1, 10, or 100"));
    }

    #[test]
    fn parse_rejects_missing_unit() {
        let err = "10".parse::<Timescale>().unwrap_err();
        assert!(err.to_string().contains("missing unit"));
    }

    #[test]
    fn parse_rejects_unknown_unit() {
        let err = "1min".parse::<Timescale>().unwrap_err();
        assert!(err.to_string().contains("unknown unit"));
    }

    #[test]
    fn parse_rejects_no_number() {
        let err = "ns".parse::<Timescale>().unwrap_err();
        assert!(err.to_string().contains("no numeric value"));
    }

    #[test]
    fn deserialize_from_json_string() {
        let t: Timescale = serde_json::from_str("\"100ps\"").unwrap();
        assert_eq!(t, Timescale::new(100, TimeUnit::Ps).unwrap());
        assert!(serde_json::from_str::<Timescale>("\"3ps\"").is_err());
    }
}
