//! Evaluation facts — the transient inputs a trigger is evaluated against.

use std::time::Duration;

use chrono::{FixedOffset, Offset, TimeDelta, Utc};

use crate::device::Device;
use crate::location::Location;
use crate::time::Timestamp;

/// One observation offered to the condition evaluator. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationFact {
    /// A device state snapshot.
    Device(Device),
    /// A location snapshot carrying the current weather.
    Weather(Location),
    /// A scheduler clock tick.
    Tick(ClockTick),
}

impl EvaluationFact {
    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Device(_) => "device",
            Self::Weather(_) => "weather",
            Self::Tick(_) => "tick",
        }
    }
}

/// A clock tick plus the context time-based triggers need.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockTick {
    /// The instant of this tick.
    pub at: Timestamp,
    /// End of the span the previous tick covered; a scheduled trigger
    /// matches when its target falls in `(since, at]`.
    pub since: Timestamp,
    /// Offset used to compute the local time of day.
    pub utc_offset: FixedOffset,
    pub sunrise: Option<Timestamp>,
    pub sunset: Option<Timestamp>,
    /// When the current trigger collection was loaded (`now` reference).
    pub loaded_at: Timestamp,
}

impl ClockTick {
    /// A tick in UTC with no known sun times, covering the `window` before `at`.
    #[must_use]
    pub fn new(at: Timestamp, window: Duration, loaded_at: Timestamp) -> Self {
        let since = TimeDelta::from_std(window)
            .ok()
            .and_then(|window| at.checked_sub_signed(window))
            .unwrap_or(at);
        Self {
            at,
            since,
            utc_offset: Utc.fix(),
            sunrise: None,
            sunset: None,
            loaded_at,
        }
    }

    /// Cover everything since the previous tick, so late or jittered ticks
    /// leave no gap. Ignored unless `previous` is before this tick.
    #[must_use]
    pub fn after(mut self, previous: Timestamp) -> Self {
        if previous < self.at {
            self.since = previous;
        }
        self
    }

    /// Take offset and sun times from a known location.
    #[must_use]
    pub fn with_location(mut self, location: &Location) -> Self {
        self.utc_offset = location.utc_offset();
        self.sunrise = location.sunrise_at();
        self.sunset = location.sunset_at();
        self
    }

    /// Override the UTC offset.
    #[must_use]
    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }
}
