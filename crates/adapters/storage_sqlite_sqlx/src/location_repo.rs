//! `SQLite` implementation of [`LocationStore`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use trygr_app::ports::LocationStore;
use trygr_domain::error::TrygrError;
use trygr_domain::id::PostalCode;
use trygr_domain::location::{Location, Weather};

use crate::error::StorageError;

struct Wrapper(Location);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let postal_code: String = row.try_get("postal_code")?;

        Ok(Self(Location {
            postal_code: PostalCode::new(postal_code),
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            country_code: row.try_get("country_code")?,
            utc_offset_seconds: row.try_get("utc_offset_seconds")?,
            sunrise: row.try_get("sunrise")?,
            sunset: row.try_get("sunset")?,
            current_weather: Weather {
                temperature: row.try_get("temperature")?,
                windspeed: row.try_get("windspeed")?,
            },
            last_updated: row.try_get("last_updated")?,
        }))
    }
}

const UPSERT: &str = "INSERT INTO locations \
    (postal_code, latitude, longitude, city, state, country_code, utc_offset_seconds, \
     sunrise, sunset, temperature, windspeed, last_updated) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
    ON CONFLICT(postal_code) DO UPDATE SET \
     latitude = excluded.latitude, longitude = excluded.longitude, city = excluded.city, \
     state = excluded.state, country_code = excluded.country_code, \
     utc_offset_seconds = excluded.utc_offset_seconds, sunrise = excluded.sunrise, \
     sunset = excluded.sunset, temperature = excluded.temperature, \
     windspeed = excluded.windspeed, last_updated = excluded.last_updated";
const SELECT_BY_POSTAL_CODE: &str = "SELECT * FROM locations WHERE postal_code = ?";

/// `SQLite`-backed location cache.
pub struct SqliteLocationStore {
    pool: SqlitePool,
}

impl SqliteLocationStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl LocationStore for SqliteLocationStore {
    fn get_by_postal_code(
        &self,
        postal_code: &PostalCode,
    ) -> impl Future<Output = Result<Option<Location>, TrygrError>> + Send {
        let pool = self.pool.clone();
        let postal_code = postal_code.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_POSTAL_CODE)
                .bind(postal_code)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn upsert(
        &self,
        location: Location,
    ) -> impl Future<Output = Result<Location, TrygrError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPSERT)
                .bind(location.postal_code.as_str())
                .bind(&location.latitude)
                .bind(&location.longitude)
                .bind(&location.city)
                .bind(&location.state)
                .bind(&location.country_code)
                .bind(location.utc_offset_seconds)
                .bind(location.sunrise)
                .bind(location.sunset)
                .bind(location.current_weather.temperature)
                .bind(location.current_weather.windspeed)
                .bind(location.last_updated)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(location)
        }
    }
}
