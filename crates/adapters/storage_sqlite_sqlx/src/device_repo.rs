//! `SQLite` implementation of [`DeviceStore`].

use std::future::Future;

use chrono::{DateTime, SecondsFormat};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use trygr_app::ports::DeviceStore;
use trygr_domain::device::Device;
use trygr_domain::error::TrygrError;
use trygr_domain::id::DeviceId;

use crate::error::StorageError;

struct Wrapper(Device);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let last_updated: String = row.try_get("last_updated")?;
        let last_updated = DateTime::parse_from_rfc3339(&last_updated)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(Device {
            id: DeviceId::new(id),
            name: row.try_get("name")?,
            vendor: row.try_get("vendor")?,
            device_type: row.try_get("device_type")?,
            status: row.try_get("status")?,
            on_ac_power: row.try_get("on_ac_power")?,
            has_brightness: row.try_get("has_brightness")?,
            has_volume: row.try_get("has_volume")?,
            brightness: row.try_get("brightness")?,
            volume: row.try_get("volume")?,
            on_time: row.try_get("on_time")?,
            ip: row.try_get("ip")?,
            port: row.try_get("port")?,
            last_updated,
        }))
    }
}

const UPSERT: &str = "INSERT INTO devices \
    (id, name, vendor, device_type, status, on_ac_power, has_brightness, has_volume, \
     brightness, volume, on_time, ip, port, last_updated) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
    ON CONFLICT(id) DO UPDATE SET \
     name = excluded.name, vendor = excluded.vendor, device_type = excluded.device_type, \
     status = excluded.status, on_ac_power = excluded.on_ac_power, \
     has_brightness = excluded.has_brightness, has_volume = excluded.has_volume, \
     brightness = excluded.brightness, volume = excluded.volume, on_time = excluded.on_time, \
     ip = excluded.ip, port = excluded.port, last_updated = excluded.last_updated";
const SELECT_BY_ID: &str = "SELECT * FROM devices WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM devices ORDER BY id";

/// `SQLite`-backed device cache.
pub struct SqliteDeviceStore {
    pool: SqlitePool,
}

impl SqliteDeviceStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DeviceStore for SqliteDeviceStore {
    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, TrygrError>> + Send {
        let pool = self.pool.clone();
        let id = id.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, TrygrError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn upsert(&self, device: Device) -> impl Future<Output = Result<Device, TrygrError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPSERT)
                .bind(device.id.as_str())
                .bind(&device.name)
                .bind(&device.vendor)
                .bind(&device.device_type)
                .bind(&device.status)
                .bind(device.on_ac_power)
                .bind(device.has_brightness)
                .bind(device.has_volume)
                .bind(device.brightness)
                .bind(device.volume)
                .bind(device.on_time)
                .bind(&device.ip)
                .bind(device.port)
                .bind(
                    device
                        .last_updated
                        .to_rfc3339_opts(SecondsFormat::Micros, true),
                )
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(device)
        }
    }
}
