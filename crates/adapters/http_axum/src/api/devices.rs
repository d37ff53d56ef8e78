//! JSON REST handlers for devices.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use trygr_app::ports::{DeviceStore, EventPublisher};
use trygr_domain::device::Device;
use trygr_domain::id::DeviceId;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Device>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and upsert endpoints.
pub enum DeviceResponse {
    Ok(Json<Device>),
}

impl IntoResponse for DeviceResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list<DS, LS, P>(
    State(state): State<AppState<DS, LS, P>>,
) -> Result<ListResponse, ApiError>
where
    DS: DeviceStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let devices = state.device_service.list_devices().await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `GET /api/devices/{id}`
pub async fn get<DS, LS, P>(
    State(state): State<AppState<DS, LS, P>>,
    Path(id): Path<String>,
) -> Result<DeviceResponse, ApiError>
where
    DS: DeviceStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let device = state.device_service.get_device(&DeviceId::new(id)).await?;
    Ok(DeviceResponse::Ok(Json(device)))
}

/// `PUT /api/devices`
///
/// Upserts the device and pushes it to the trigger engine.
pub async fn upsert<DS, LS, P>(
    State(state): State<AppState<DS, LS, P>>,
    Json(device): Json<Device>,
) -> Result<DeviceResponse, ApiError>
where
    DS: DeviceStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let saved = state.device_service.upsert_device(device).await?;
    Ok(DeviceResponse::Ok(Json(saved)))
}
