//! In-memory stores and helpers shared by the router tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::response::Response;

use trygr_app::event_bus::InProcessEventBus;
use trygr_app::ports::{DeviceStore, LocationStore};
use trygr_app::services::device_cache_service::DeviceCacheService;
use trygr_app::services::location_cache_service::LocationCacheService;
use trygr_app::trigger_engine::TriggerSet;
use trygr_domain::device::Device;
use trygr_domain::error::TrygrError;
use trygr_domain::id::{DeviceId, PostalCode};
use trygr_domain::location::Location;

use crate::state::AppState;

#[derive(Default)]
pub struct MemoryDevices(Mutex<HashMap<DeviceId, Device>>);

impl DeviceStore for MemoryDevices {
    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, TrygrError>> + Send {
        let result = self.0.lock().unwrap().get(id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, TrygrError>> + Send {
        let result = self.0.lock().unwrap().values().cloned().collect();
        async { Ok(result) }
    }

    fn upsert(&self, device: Device) -> impl Future<Output = Result<Device, TrygrError>> + Send {
        self.0
            .lock()
            .unwrap()
            .insert(device.id.clone(), device.clone());
        async { Ok(device) }
    }
}

#[derive(Default)]
pub struct MemoryLocations(Mutex<HashMap<PostalCode, Location>>);

impl LocationStore for MemoryLocations {
    fn get_by_postal_code(
        &self,
        postal_code: &PostalCode,
    ) -> impl Future<Output = Result<Option<Location>, TrygrError>> + Send {
        let result = self.0.lock().unwrap().get(postal_code).cloned();
        async { Ok(result) }
    }

    fn upsert(
        &self,
        location: Location,
    ) -> impl Future<Output = Result<Location, TrygrError>> + Send {
        self.0
            .lock()
            .unwrap()
            .insert(location.postal_code.clone(), location.clone());
        async { Ok(location) }
    }
}

pub type TestState = AppState<MemoryDevices, MemoryLocations, InProcessEventBus>;

pub fn test_state_with_bus() -> (TestState, InProcessEventBus) {
    let bus = InProcessEventBus::new(16);
    let state = AppState::new(
        Arc::new(DeviceCacheService::new(MemoryDevices::default(), bus.clone())),
        Arc::new(LocationCacheService::new(
            MemoryLocations::default(),
            bus.clone(),
        )),
        Arc::new(TriggerSet::new(Vec::new())),
    );
    (state, bus)
}

pub fn test_state() -> TestState {
    test_state_with_bus().0
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
