//! API error taxonomy
//!
//! Every failure a request can hit is mapped to one of these kinds and rendered
//! at the boundary as an HTTP status plus a JSON body:
//! `{"message": "...", "details": [...]}` (`details` only when non-empty).

use crate::auth::middleware::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },
    #[error("{0}")]
    NotFound(String),
    /// Password mismatch
    #[error("{0}")]
    Authentication(String),
    #[error(transparent)]
    Authorization(#[from] AuthError),
    #[error("{0}")]
    Conflict(String),
    /// Signing, store or hashing failure
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(auth) => auth.status(),
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let details = match self {
            ApiError::Validation { details, .. } => details,
            _ => Vec::new(),
        };
        let body = ErrorBody { message, details };

        (status, Json(body)).into_response()
    }
}
