//! Storage ports — the device and location caches.

use std::future::Future;
use std::sync::Arc;

use trygr_domain::device::Device;
use trygr_domain::error::TrygrError;
use trygr_domain::id::{DeviceId, PostalCode};
use trygr_domain::location::Location;

/// Key-value cache of [`Device`] snapshots keyed by vendor id.
pub trait DeviceStore {
    /// Get a device by id, `None` when absent.
    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, TrygrError>> + Send;

    /// Get all devices.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, TrygrError>> + Send;

    /// Insert or replace a device, returning the stored snapshot.
    fn upsert(&self, device: Device) -> impl Future<Output = Result<Device, TrygrError>> + Send;
}

/// Key-value cache of [`Location`]s keyed by postal code.
pub trait LocationStore {
    /// Get a location by postal code, `None` when absent.
    fn get_by_postal_code(
        &self,
        postal_code: &PostalCode,
    ) -> impl Future<Output = Result<Option<Location>, TrygrError>> + Send;

    /// Insert or replace a location, returning the stored snapshot.
    fn upsert(
        &self,
        location: Location,
    ) -> impl Future<Output = Result<Location, TrygrError>> + Send;
}

impl<T: DeviceStore + Send + Sync> DeviceStore for Arc<T> {
    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, TrygrError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, TrygrError>> + Send {
        (**self).get_all()
    }

    fn upsert(&self, device: Device) -> impl Future<Output = Result<Device, TrygrError>> + Send {
        (**self).upsert(device)
    }
}

impl<T: LocationStore + Send + Sync> LocationStore for Arc<T> {
    fn get_by_postal_code(
        &self,
        postal_code: &PostalCode,
    ) -> impl Future<Output = Result<Option<Location>, TrygrError>> + Send {
        (**self).get_by_postal_code(postal_code)
    }

    fn upsert(
        &self,
        location: Location,
    ) -> impl Future<Output = Result<Location, TrygrError>> + Send {
        (**self).upsert(location)
    }
}
