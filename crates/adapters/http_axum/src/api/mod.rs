//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod locations;
#[allow(clippy::missing_errors_doc)]
pub mod triggers;

use axum::Router;
use axum::routing::{get, put};

use trygr_app::ports::{DeviceStore, EventPublisher, LocationStore};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<DS, LS, P>() -> Router<AppState<DS, LS, P>>
where
    DS: DeviceStore + Send + Sync + 'static,
    LS: LocationStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/triggers",
            get(triggers::list::<DS, LS, P>).put(triggers::replace::<DS, LS, P>),
        )
        .route(
            "/devices",
            get(devices::list::<DS, LS, P>).put(devices::upsert::<DS, LS, P>),
        )
        .route("/devices/{id}", get(devices::get::<DS, LS, P>))
        .route("/locations", put(locations::upsert::<DS, LS, P>))
        .route("/locations/{postal_code}", get(locations::get::<DS, LS, P>))
}
