//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `last_updated`, tick instants, firing times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Convert epoch seconds (as stored for sunrise/sunset) into a [`Timestamp`].
///
/// Returns `None` for values outside chrono's representable range.
#[must_use]
pub fn from_epoch_seconds(secs: i64) -> Option<Timestamp> {
    DateTime::from_timestamp(secs, 0)
}
