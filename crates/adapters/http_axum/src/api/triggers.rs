//! JSON REST handlers for the trigger collection.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use trygr_domain::trigger::Trigger;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the trigger endpoints.
pub enum TriggersResponse {
    Ok(Json<Vec<Trigger>>),
}

impl IntoResponse for TriggersResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/triggers`
pub async fn list<DS, LS, P>(State(state): State<AppState<DS, LS, P>>) -> TriggersResponse {
    let (triggers, _) = state.triggers.snapshot();
    TriggersResponse::Ok(Json(triggers.to_vec()))
}

/// `PUT /api/triggers`
///
/// Replaces the whole collection. Nothing changes when any trigger is invalid.
pub async fn replace<DS, LS, P>(
    State(state): State<AppState<DS, LS, P>>,
    Json(triggers): Json<Vec<Trigger>>,
) -> Result<TriggersResponse, ApiError> {
    state.triggers.replace(triggers)?;
    let (triggers, _) = state.triggers.snapshot();
    Ok(TriggersResponse::Ok(Json(triggers.to_vec())))
}
