//! Device cache service — write-through device cache that pushes every write
//! to the trigger engine.

use std::future::Future;

use trygr_domain::device::Device;
use trygr_domain::error::{NotFoundError, TrygrError};
use trygr_domain::event::Event;
use trygr_domain::id::DeviceId;
use trygr_domain::time::now;

use crate::ports::{DeviceStore, EventPublisher};

/// Application service in front of a [`DeviceStore`].
///
/// Every successful write publishes [`Event::DeviceUpdated`]. Publishing is
/// fire-and-forget: the writer never waits for, or hears about, trigger
/// evaluation.
pub struct DeviceCacheService<S, P> {
    store: S,
    publisher: P,
}

impl<S, P> DeviceCacheService<S, P>
where
    S: DeviceStore + Sync,
    P: EventPublisher + Sync,
{
    /// Create a new service backed by the given store and publisher.
    pub fn new(store: S, publisher: P) -> Self {
        Self { store, publisher }
    }

    /// Validate, stamp `last_updated`, persist and publish a device.
    ///
    /// # Errors
    ///
    /// Returns [`TrygrError::Validation`] if invariants fail, or a
    /// storage error propagated from the store.
    #[tracing::instrument(skip(self, device), fields(device = %device.id))]
    pub async fn upsert_device(&self, mut device: Device) -> Result<Device, TrygrError> {
        device.validate()?;
        device.last_updated = now();
        let saved = self.store.upsert(device).await?;
        if let Err(err) = self
            .publisher
            .publish(Event::DeviceUpdated(saved.clone()))
            .await
        {
            tracing::warn!(%err, "failed to publish device update");
        }
        Ok(saved)
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TrygrError::NotFound`] when no device with `id` exists,
    /// or a storage error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(&self, id: &DeviceId) -> Result<Device, TrygrError> {
        self.store.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all cached devices.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_devices(&self) -> Result<Vec<Device>, TrygrError> {
        self.store.get_all().await
    }
}

/// Lets the dispatcher write back through the cache, so vendor-reported
/// state changes reach the engine like any other device write.
impl<S, P> DeviceStore for DeviceCacheService<S, P>
where
    S: DeviceStore + Sync,
    P: EventPublisher + Sync,
{
    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, TrygrError>> + Send {
        self.store.get_by_id(id)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, TrygrError>> + Send {
        self.store.get_all()
    }

    fn upsert(&self, device: Device) -> impl Future<Output = Result<Device, TrygrError>> + Send {
        self.upsert_device(device)
    }
}
