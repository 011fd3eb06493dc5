//! Authentication Service
//! Mission: Verify credentials against the user store and issue session tokens

use crate::auth::{
    jwt::JwtHandler,
    models::{Identity, LoginRequest},
    user_store::UserStore,
};
use crate::error::ApiError;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const MESSAGE_BINDING_ERROR: &str = "el formato del cuerpo de la solicitud no es válido";
pub const MESSAGE_USER_NOT_FOUND: &str = "ususario no encontrado";
pub const MESSAGE_INCORRECT_PASSWORD: &str = "la contraseña es incorrecta";
pub const MESSAGE_LOOKUP_FAILED: &str = "no pudimos autenticar al usuario";
pub const MESSAGE_TOKEN_NOT_CREATED: &str = "no se pudo generar el token";

pub struct AuthService {
    store: Arc<dyn UserStore>,
    jwt: Arc<JwtHandler>,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, jwt: Arc<JwtHandler>) -> Self {
        Self { store, jwt }
    }

    /// Single-pass login: credentials check, lookup, password compare, issue.
    pub fn login(&self, credentials: &LoginRequest) -> Result<String, ApiError> {
        if !credentials.is_complete() {
            warn!("Login rejected: username and password are required");
            return Err(ApiError::bad_request(MESSAGE_BINDING_ERROR));
        }

        // Store failures are answered like a miss so store internals stay private
        let user = match self.store.find_by_username(&credentials.username) {
            Ok(Some(user)) => user,
            Ok(None) => {
                info!("Login failed: user {} not found", credentials.username);
                return Err(ApiError::NotFound(MESSAGE_USER_NOT_FOUND.to_string()));
            }
            Err(e) => {
                error!("User lookup failed for {}: {:#}", credentials.username, e);
                return Err(ApiError::NotFound(MESSAGE_LOOKUP_FAILED.to_string()));
            }
        };

        let matches = bcrypt::verify(&credentials.password, &user.password_hash).unwrap_or_else(|e| {
            error!("Stored hash for {} is unusable: {}", user.username, e);
            false
        });

        if !matches {
            warn!("Failed login attempt: {}", user.username);
            return Err(ApiError::Authentication(
                MESSAGE_INCORRECT_PASSWORD.to_string(),
            ));
        }

        let token = self.jwt.issue(&Identity::from(&user)).map_err(|e| {
            error!("Cannot generate JWT for {}: {}", user.username, e);
            ApiError::Internal(MESSAGE_TOKEN_NOT_CREATED.to_string())
        })?;

        info!("Login successful: {} ({})", user.username, user.role);
        Ok(token)
    }
}
