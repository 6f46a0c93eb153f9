//! Structural check of a recorded VCD trace.
//!
//! Reads a trace back and confirms the property downstream viewers rely on:
//! one `#tick` record per tick, starting at 0, strictly increasing by one,
//! with every value change referring to a declared variable. It does not
//! compare traces against each other.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::Serialize;
use thiserror::Error;

use super::is_gzip_path;

/// Errors found while checking a trace.
#[derive(Debug, Error)]
pub enum TraceCheckError {
    /// An I/O error occurred while reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line could not be understood.
    #[error("malformed trace at line {line}: {message}")]
    Malformed {
        /// The 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A tick was skipped.
    #[error("gap at line {line}: expected #{expected}, found #{found}")]
    Gap {
        /// The 1-based line number.
        line: usize,
        /// The tick that should have come next.
        expected: u64,
        /// The tick that was found.
        found: u64,
    },

    /// A tick was repeated or went backwards.
    #[error("tick not increasing at line {line}: #{found} after #{previous}")]
    NotIncreasing {
        /// The 1-based line number.
        line: usize,
        /// The previous tick.
        previous: u64,
        /// The offending tick.
        found: u64,
    },

    /// The trace contains no tick records.
    #[error("trace contains no tick records")]
    Empty,
}

/// What a successful check found.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TraceSummary {
    /// Number of traced variables.
    pub signals: usize,
    /// Number of tick records.
    pub records: u64,
    /// The first tick (always 0 for a valid trace).
    pub first_tick: u64,
    /// The last tick recorded.
    pub last_tick: u64,
}

/// Checks a VCD trace from a buffered reader.
pub fn check_trace<R: BufRead>(reader: R) -> Result<TraceSummary, TraceCheckError> {
    let mut codes: HashSet<String> = HashSet::new();
    let mut in_definitions = true;
    let mut previous: Option<u64> = None;
    let mut records = 0u64;

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line_num = n + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if in_definitions {
            if trimmed.starts_with("$enddefinitions") {
                in_definitions = false;
            } else if let Some(rest) = trimmed.strip_prefix("$var") {
                // $var <type> <width> <code> <name> [range] $end
                let fields: Vec<&str> = rest.split_whitespace().collect();
                if fields.len() < 4 {
                    return Err(TraceCheckError::Malformed {
                        line: line_num,
                        message: format!("incomplete $var declaration: {trimmed}"),
                    });
                }
                codes.insert(fields[2].to_string());
            }
            continue;
        }

        if trimmed.starts_with("$dumpvars") || trimmed.starts_with("$end") {
            continue;
        }

        if let Some(time_str) = trimmed.strip_prefix('#') {
            let tick: u64 = time_str.parse().map_err(|_| TraceCheckError::Malformed {
                line: line_num,
                message: format!("invalid timestamp: {trimmed}"),
            })?;
            let expected = previous.map_or(0, |p| p + 1);
            if let Some(p) = previous {
                if tick <= p {
                    return Err(TraceCheckError::NotIncreasing {
                        line: line_num,
                        previous: p,
                        found: tick,
                    });
                }
            }
            if tick != expected {
                return Err(TraceCheckError::Gap {
                    line: line_num,
                    expected,
                    found: tick,
                });
            }
            previous = Some(tick);
            records += 1;
            continue;
        }

        if previous.is_none() {
            return Err(TraceCheckError::Malformed {
                line: line_num,
                message: "value change before the first timestamp".to_string(),
            });
        }
        let code = value_change_code(trimmed).ok_or_else(|| TraceCheckError::Malformed {
            line: line_num,
            message: format!("unrecognized value change: {trimmed}"),
        })?;
        if !codes.contains(code) {
            return Err(TraceCheckError::Malformed {
                line: line_num,
                message: format!("value change for undeclared code '{code}'"),
            });
        }
    }

    if in_definitions {
        return Err(TraceCheckError::Malformed {
            line: 0,
            message: "missing $enddefinitions".to_string(),
        });
    }
    let last_tick = previous.ok_or(TraceCheckError::Empty)?;
    Ok(TraceSummary {
        signals: codes.len(),
        records,
        first_tick: 0,
        last_tick,
    })
}

/// Checks a trace file, transparently decompressing `.gz` paths.
pub fn check_trace_file(path: &Path) -> Result<TraceSummary, TraceCheckError> {
    let file = File::open(path)?;
    if is_gzip_path(path) {
        check_trace(BufReader::new(GzDecoder::new(file)))
    } else {
        check_trace(BufReader::new(file))
    }
}

/// Extracts the identifier code from a value-change line.
///
/// Scalars are `<value><code>` (`1!`); vectors are `b<bits> <code>`.
fn value_change_code(line: &str) -> Option<&str> {
    let first = line.chars().next()?;
    match first {
        'b' | 'B' | 'r' | 'R' => {
            let (_, code) = line.split_once(char::is_whitespace)?;
            let code = code.trim();
            (!code.is_empty()).then_some(code)
        }
        '0' | '1' | 'x' | 'X' | 'z' | 'Z' => {
            let code = &line[1..];
            (!code.is_empty()).then_some(code)
        }
        _ => None,
    }
}
