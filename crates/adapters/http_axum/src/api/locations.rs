//! JSON REST handlers for locations.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use trygr_app::ports::{EventPublisher, LocationStore};
use trygr_domain::id::PostalCode;
use trygr_domain::location::Location;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the location endpoints.
pub enum LocationResponse {
    Ok(Json<Location>),
}

impl IntoResponse for LocationResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/locations/{postal_code}`
pub async fn get<DS, LS, P>(
    State(state): State<AppState<DS, LS, P>>,
    Path(postal_code): Path<String>,
) -> Result<LocationResponse, ApiError>
where
    LS: LocationStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let location = state
        .location_service
        .get_location(&PostalCode::new(postal_code))
        .await?;
    Ok(LocationResponse::Ok(Json(location)))
}

/// `PUT /api/locations`
///
/// Upserts the location and pushes its weather to the trigger engine.
pub async fn upsert<DS, LS, P>(
    State(state): State<AppState<DS, LS, P>>,
    Json(location): Json<Location>,
) -> Result<LocationResponse, ApiError>
where
    LS: LocationStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let saved = state.location_service.upsert_location(location).await?;
    Ok(LocationResponse::Ok(Json(saved)))
}
