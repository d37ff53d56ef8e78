//! Shared application state for axum handlers.

use std::sync::Arc;

use trygr_app::services::device_cache_service::DeviceCacheService;
use trygr_app::services::location_cache_service::LocationCacheService;
use trygr_app::trigger_engine::TriggerSet;

/// Application state shared across all axum handlers.
///
/// Generic over the device store, location store and event publisher to
/// avoid dynamic dispatch. `Clone` is implemented manually so the
/// underlying types themselves do not need to be `Clone`; only the `Arc`
/// wrappers are cloned.
pub struct AppState<DS, LS, P> {
    /// Write-through device cache (push entry point for device state).
    pub device_service: Arc<DeviceCacheService<DS, P>>,
    /// Write-through location cache (push entry point for weather).
    pub location_service: Arc<LocationCacheService<LS, P>>,
    /// The live trigger collection evaluated by the engine.
    pub triggers: Arc<TriggerSet>,
}

impl<DS, LS, P> Clone for AppState<DS, LS, P> {
    fn clone(&self) -> Self {
        Self {
            device_service: Arc::clone(&self.device_service),
            location_service: Arc::clone(&self.location_service),
            triggers: Arc::clone(&self.triggers),
        }
    }
}

impl<DS, LS, P> AppState<DS, LS, P> {
    /// Create the state from services already shared with background tasks.
    pub fn new(
        device_service: Arc<DeviceCacheService<DS, P>>,
        location_service: Arc<LocationCacheService<LS, P>>,
        triggers: Arc<TriggerSet>,
    ) -> Self {
        Self {
            device_service,
            location_service,
            triggers,
        }
    }
}
