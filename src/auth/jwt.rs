//! JWT Token Handler
//! Mission: Sign and parse session tokens with the shared secret

use crate::auth::models::{Claims, Identity};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;

/// Issuer written into (and expected from) every session token
pub const ISSUER: &str = "GAPEF";

/// Session tokens live for three minutes unless configured otherwise
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 180;

/// Only the HMAC family is accepted on decode
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("failed to parse token: {0}")]
    Parse(jsonwebtoken::errors::Error),
}

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with the default validity window
    pub fn new(secret: &str) -> Self {
        Self::with_validity(secret, Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
    }

    pub fn with_validity(secret: &str, validity: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validity,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Sign a fresh token for the given identity
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: identity.username.clone(),
            id: identity.id.clone(),
            role: Some(identity.role),
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };

        debug!(
            "Issuing JWT for user {} ({}), expires in {}s",
            identity.username,
            identity.id,
            self.validity.num_seconds()
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Parse a compact token and verify its signature.
    ///
    /// The JWT library also rejects an already passed `exp` (zero leeway);
    /// the issuer is left to [`crate::auth::TokenValidator`].
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Parse)
    }
}
