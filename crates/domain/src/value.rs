//! Polymorphic string-or-number values used by triggers and actions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MalformedTriggerError;

/// A trigger or action value, written either as a string or a number.
///
/// Serialized untagged so rule authors write `"on"` or `40` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Render the value as text for string comparisons.
    ///
    /// Integral numbers render without a fractional part, so `40` compares
    /// equal to the status `"40"`.
    #[must_use]
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// Coerce the value to a number.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedTriggerError::NotANumber`] when a text value does
    /// not parse as a finite number.
    pub fn as_number(&self) -> Result<f64, MalformedTriggerError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| MalformedTriggerError::NotANumber(s.clone())),
        }
    }
}

impl fmt::Display for Value {
    #[allow(clippy::float_cmp)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{n:.0}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}
