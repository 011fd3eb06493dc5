//! User API Endpoints
//! Mission: List and create team members (coach only)

use crate::app::AppState;
use crate::auth::models::{Claims, CreateUserRequest, UserResponse};
use crate::error::ApiError;
use crate::users::service::MESSAGE_INVALID_BODY;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::{info, warn};

/// `?page&size`; anything missing or unparsable counts as 0
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub size: Option<String>,
}

impl PageQuery {
    fn number(raw: &Option<String>) -> u64 {
        raw.as_deref()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn page(&self) -> u64 {
        Self::number(&self.page)
    }

    pub fn size(&self) -> u64 {
        Self::number(&self.size)
    }
}

/// List users - GET /users?page&size
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list(query.page(), query.size())?;
    Ok(Json(users))
}

/// Create user - POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Unreadable user body: {}", rejection);
        ApiError::bad_request(MESSAGE_INVALID_BODY)
    })?;

    let user = state.users.create(request)?;
    info!("User {} created by {}", user.username, claims.sub);

    Ok(StatusCode::CREATED)
}
