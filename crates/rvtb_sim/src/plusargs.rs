//! Passthrough `+name=value` arguments for simulation models.
//!
//! The harness does not interpret these; it hands them to the model factory
//! the same way a compiled simulator forwards its command line to
//! `$test$plusargs` / `$value$plusargs`. Arguments without a leading `+` are
//! ignored so engine flags can share the same argument list.

use std::str::FromStr;

/// Errors produced when reading a typed plusarg.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlusargError {
    /// `+name` was given without `=value` where a value is required.
    #[error("plusarg +{name} requires a value (+{name}=...)")]
    MissingValue {
        /// The plusarg name.
        name: String,
    },

    /// The value did not parse as the requested type.
    #[error("invalid value '{value}' for plusarg +{name}: {reason}")]
    Invalid {
        /// The plusarg name.
        name: String,
        /// The raw value.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// A parsed list of plusargs, in command-line order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plusargs {
    entries: Vec<(String, Option<String>)>,
}

impl Plusargs {
    /// Collects every `+name` and `+name=value` argument.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = args
            .into_iter()
            .filter_map(|arg| {
                let body = arg.as_ref().strip_prefix('+')?;
                let (name, value) = match body.split_once('=') {
                    Some((n, v)) => (n, Some(v.to_string())),
                    None => (body, None),
                };
                if name.is_empty() {
                    None
                } else {
                    Some((name.to_string(), value))
                }
            })
            .collect();
        Self { entries }
    }

    /// True if `+name` or `+name=...` was given.
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// The value of the first `+name=value`, if any.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Parses the value of `+name=value` as `T`.
    ///
    /// Returns `Ok(None)` when the plusarg is absent and an error when it is
    /// present without a value or with a value that does not parse.
    pub fn parse_value<T>(&self, name: &str) -> Result<Option<T>, PlusargError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some((_, value)) = self.entries.iter().find(|(n, _)| n == name) else {
            return Ok(None);
        };
        let value = value.as_deref().ok_or_else(|| PlusargError::MissingValue {
            name: name.to_string(),
        })?;
        value
            .parse::<T>()
            .map(Some)
            .map_err(|e| PlusargError::Invalid {
                name: name.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            })
    }

    /// Number of plusargs collected.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no plusargs were given.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
