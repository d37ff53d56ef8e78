//! Parsing of scheduled trigger values.

use chrono::NaiveTime;

use crate::error::MalformedTriggerError;
use crate::value::Value;

/// Parse a wall-clock time of day written as `HH:MM` or `HH:MM:SS`.
///
/// # Errors
///
/// Returns [`MalformedTriggerError::NotATimeOfDay`] for anything else.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, MalformedTriggerError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| MalformedTriggerError::NotATimeOfDay(raw.to_string()))
}

/// The instant a `relativeTime` trigger counts its offset from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelativeReference {
    Sunrise,
    Sunset,
    /// The instant the trigger collection was loaded.
    Now,
    /// A number of minutes after the load instant.
    MinutesFromNow(f64),
}

impl RelativeReference {
    /// Interpret a trigger value as a reference.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedTriggerError::UnknownReference`] when the value is
    /// neither a known keyword nor a number.
    pub fn parse(value: &Value) -> Result<Self, MalformedTriggerError> {
        if let Value::Number(minutes) = value {
            return Ok(Self::MinutesFromNow(*minutes));
        }
        let text = value.as_text();
        match text.trim().to_ascii_lowercase().as_str() {
            "sunrise" => Ok(Self::Sunrise),
            "sunset" => Ok(Self::Sunset),
            "now" => Ok(Self::Now),
            _ => value
                .as_number()
                .map(Self::MinutesFromNow)
                .map_err(|_| MalformedTriggerError::UnknownReference(text)),
        }
    }
}
