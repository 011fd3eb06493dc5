//! Authentication API Endpoints
//! Mission: Exchange credentials for a session token

use crate::app::AppState;
use crate::auth::{
    models::{LoginRequest, LoginResponse},
    service::MESSAGE_BINDING_ERROR,
};
use crate::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, warn};

/// Login endpoint - POST /login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(credentials) = payload.map_err(|rejection| {
        warn!("Unreadable login body: {}", rejection);
        ApiError::bad_request(MESSAGE_BINDING_ERROR)
    })?;

    info!("Login attempt: {}", credentials.username);

    let token = state.auth.login(&credentials)?;
    Ok(Json(LoginResponse { token }))
}
