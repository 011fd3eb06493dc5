//! Authentication Middleware
//! Mission: Require valid session tokens and gate routes by role
//!
//! Both gates are axum interceptors (`middleware::from_fn_with_state`) composed
//! by [`crate::app::router`]. On success they put the validated [`Claims`] into
//! the request extensions so handlers can read them with `Extension<Claims>`.

use crate::auth::{
    models::{Claims, UserRole},
    validator::TokenValidator,
};
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

pub const LOGIN_PATH: &str = "/login";
pub const HEALTH_PATH: &str = "/health";

const BEARER_PREFIX: &str = "Bearer ";

/// Authorization failures. The display text is what clients receive.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Debe enviarse un JWT válido")]
    MissingToken,
    /// Token refused by the authentication gate
    #[error("Debe enviarse un JWT válido")]
    InvalidToken,
    /// Token refused by a role gate
    #[error("El JWT no es válido")]
    UnverifiedToken,
    #[error("El usuario no tiene el rol requerido")]
    InsufficientRole,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::UnverifiedToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken | AuthError::InsufficientRole => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Token from the `Authorization` header, `Bearer ` prefix stripped when present.
/// An empty header counts as absent.
fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.strip_prefix(BEARER_PREFIX).unwrap_or(s).trim())
        .filter(|t| !t.is_empty())
}

/// Authentication gate: every route except login and health needs a valid token
pub async fn auth_middleware(
    State(validator): State<TokenValidator>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = req.uri().path();
    if path == LOGIN_PATH || path == HEALTH_PATH {
        return Ok(next.run(req).await);
    }

    let Some(token) = bearer_token(&req) else {
        warn!(kind = "missing_token", path = %req.uri().path(), "JWT not present in the request");
        return Err(AuthError::MissingToken);
    };

    let claims = validator.validate(token).map_err(|rejection| {
        warn!(kind = "invalid_token", %rejection, "Error validating the JWT");
        AuthError::InvalidToken
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Role gate state: the validator plus the role a route requires
#[derive(Clone)]
pub struct RoleGate {
    validator: TokenValidator,
    required: UserRole,
}

impl RoleGate {
    pub fn new(validator: TokenValidator, required: UserRole) -> Self {
        Self {
            validator,
            required,
        }
    }

    pub fn required(&self) -> UserRole {
        self.required
    }

    /// Decide on a presented token without touching the request
    pub fn admit(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        let Some(token) = token else {
            warn!(kind = "missing_token", required = %self.required, "JWT not present in the request");
            return Err(AuthError::MissingToken);
        };

        let claims = self.validator.validate(token).map_err(|rejection| {
            warn!(kind = "invalid_token", %rejection, "Could not validate JWT");
            AuthError::UnverifiedToken
        })?;

        if claims.role != Some(self.required) {
            warn!(
                kind = "wrong_role",
                user = %claims.sub,
                role = ?claims.role,
                required = %self.required,
                "Role not allowed for this route"
            );
            return Err(AuthError::InsufficientRole);
        }

        Ok(claims)
    }
}

/// Role gate: only tokens carrying the gate's role get through
pub async fn role_middleware(
    State(gate): State<RoleGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = gate.admit(bearer_token(&req))?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
