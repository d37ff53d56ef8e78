//! Location — postal code, coordinates, sun times and current weather.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrygrError, ValidationError};
use crate::id::PostalCode;
use crate::time::{Timestamp, from_epoch_seconds};

/// Current weather observation embedded in a [`Location`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Weather {
    pub temperature: f64,
    pub windspeed: f64,
}

/// A geographic location keyed by postal code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub postal_code: PostalCode,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    /// Sunrise of the current day, epoch seconds.
    #[serde(default)]
    pub sunrise: i64,
    /// Sunset of the current day, epoch seconds.
    #[serde(default)]
    pub sunset: i64,
    pub current_weather: Weather,
    /// Epoch seconds of the last store write.
    #[serde(default)]
    pub last_updated: i64,
}

impl Location {
    /// Create a location with only a postal code and a weather observation.
    #[must_use]
    pub fn new(postal_code: impl Into<PostalCode>, current_weather: Weather) -> Self {
        Self {
            postal_code: postal_code.into(),
            latitude: String::new(),
            longitude: String::new(),
            city: String::new(),
            state: String::new(),
            country_code: String::new(),
            utc_offset_seconds: 0,
            sunrise: 0,
            sunset: 0,
            current_weather,
            last_updated: 0,
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPostalCode`] when the key is empty.
    pub fn validate(&self) -> Result<(), TrygrError> {
        if self.postal_code.is_empty() {
            return Err(ValidationError::EmptyPostalCode.into());
        }
        Ok(())
    }

    /// Sunrise as a timestamp, `None` when unknown (zero) or out of range.
    #[must_use]
    pub fn sunrise_at(&self) -> Option<Timestamp> {
        (self.sunrise != 0).then_some(self.sunrise).and_then(from_epoch_seconds)
    }

    /// Sunset as a timestamp, `None` when unknown (zero) or out of range.
    #[must_use]
    pub fn sunset_at(&self) -> Option<Timestamp> {
        (self.sunset != 0).then_some(self.sunset).and_then(from_epoch_seconds)
    }

    /// The location's UTC offset, falling back to UTC when out of range.
    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_seconds).unwrap_or_else(|| Utc.fix())
    }
}
