//! Request logging middleware.
//!
//! One line per request with method, path, status and latency. Rejections
//! from the auth gates (401/403) get their own message so failed logins and
//! probing stand out from ordinary client errors.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

use crate::auth::middleware::HEALTH_PATH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Completed,
    Denied,
    ClientError,
    ServerError,
}

impl Outcome {
    fn of(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Outcome::Denied,
            s if s.is_server_error() => Outcome::ServerError,
            s if s.is_client_error() => Outcome::ClientError,
            _ => Outcome::Completed,
        }
    }
}

pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if path == HEALTH_PATH {
        return next.run(request).await;
    }

    let start = Instant::now();
    let response = next.run(request).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    match Outcome::of(status) {
        Outcome::ServerError => warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "Request failed (5xx)"
        ),
        Outcome::Denied => warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "Request denied"
        ),
        Outcome::ClientError => info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "Request completed (4xx)"
        ),
        Outcome::Completed => info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "Request completed"
        ),
    }

    response
}
