//! Token Validator
//! Mission: Decide whether a presented session token is currently valid

use crate::auth::jwt::{JwtHandler, TokenError, ISSUER};
use crate::auth::models::Claims;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

/// Why a token was refused. Clients only ever see a generic outcome; the
/// variant is kept for operator logs.
#[derive(Debug, Error)]
pub enum TokenRejection {
    #[error("token could not be decoded: {0}")]
    Malformed(#[from] TokenError),
    #[error("token expired at {exp}")]
    Expired { exp: i64 },
    #[error("unexpected issuer {0:?}")]
    WrongIssuer(String),
}

/// Stateless validity check: signature, expiry, issuer, in that order.
#[derive(Clone)]
pub struct TokenValidator {
    codec: Arc<JwtHandler>,
}

impl TokenValidator {
    pub fn new(codec: Arc<JwtHandler>) -> Self {
        Self { codec }
    }

    /// Validate a token and hand back its claims on success
    pub fn validate(&self, token: &str) -> Result<Claims, TokenRejection> {
        self.validate_at(token, Utc::now().timestamp())
    }

    pub(crate) fn validate_at(&self, token: &str, now: i64) -> Result<Claims, TokenRejection> {
        let claims = self.codec.decode(token)?;

        if now >= claims.exp {
            return Err(TokenRejection::Expired { exp: claims.exp });
        }

        if claims.iss != ISSUER {
            return Err(TokenRejection::WrongIssuer(claims.iss));
        }

        Ok(claims)
    }
}
