//! User management: paged listing and account creation

use crate::auth::{
    models::{CreateUserRequest, User, UserResponse, UserRole},
    user_store::{DuplicateUser, UserStore},
};
use crate::error::ApiError;
use regex::Regex;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const MESSAGE_VALIDATION_ERROR: &str = "la solicitud posee datos inválidos";
pub const MESSAGE_INVALID_BODY: &str = "El DTO no es válido";
pub const MESSAGE_USER_EXISTS: &str = "el usuario ya existe";
pub const MESSAGE_CREATE_FAILED: &str = "No se pudo guardar el usuario en la DB";
pub const MESSAGE_LIST_FAILED: &str = "No se pudo recuperar los usuarios";

pub const DETAIL_INVALID_EMAIL: &str = "El email no es válido";
pub const DETAIL_INVALID_USERNAME: &str = "El username no puede ser un string vacío";
pub const DETAIL_INVALID_PASSWORD: &str = "La password no puede ser un string vacío";
pub const DETAIL_INVALID_ROLE: &str = "El rol suministrado no es válido";

lazy_static::lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex");
}

/// Check every field and report all failures at once
pub fn validate(request: &CreateUserRequest) -> Result<UserRole, Vec<String>> {
    let mut details = Vec::new();

    if !EMAIL_REGEX.is_match(&request.email) {
        details.push(DETAIL_INVALID_EMAIL.to_string());
    }
    if request.username.is_empty() {
        details.push(DETAIL_INVALID_USERNAME.to_string());
    }
    if request.password.is_empty() {
        details.push(DETAIL_INVALID_PASSWORD.to_string());
    }

    let role = UserRole::from_name(&request.role);
    if role.is_none() {
        details.push(DETAIL_INVALID_ROLE.to_string());
    }

    match role {
        Some(role) if details.is_empty() => Ok(role),
        _ => Err(details),
    }
}

pub struct UserService {
    store: Arc<dyn UserStore>,
    hash_cost: u32,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hash_cost: u32) -> Self {
        Self { store, hash_cost }
    }

    pub fn list(&self, page: u64, size: u64) -> Result<Vec<UserResponse>, ApiError> {
        let users = self.store.list(page, size).map_err(|e| {
            error!("Failed to list users (page {}, size {}): {:#}", page, size, e);
            ApiError::Internal(MESSAGE_LIST_FAILED.to_string())
        })?;

        Ok(users.iter().map(UserResponse::from_user).collect())
    }

    /// Validate, check uniqueness, hash, persist. Nothing is written unless
    /// every earlier step passed.
    pub fn create(&self, request: CreateUserRequest) -> Result<User, ApiError> {
        let role = validate(&request).map_err(|details| {
            warn!("User creation rejected: {}", details.join("; "));
            ApiError::Validation {
                message: MESSAGE_VALIDATION_ERROR.to_string(),
                details,
            }
        })?;

        let taken = self
            .store
            .exists(&request.username, &request.email)
            .map_err(|e| {
                error!("Failed to check for existing user {}: {:#}", request.username, e);
                ApiError::Internal(MESSAGE_CREATE_FAILED.to_string())
            })?;

        if taken {
            info!(
                "User {} or email {} already registered",
                request.username, request.email
            );
            return Err(ApiError::Conflict(MESSAGE_USER_EXISTS.to_string()));
        }

        let password_hash = bcrypt::hash(&request.password, self.hash_cost).map_err(|e| {
            error!("Failed to hash password for {}: {}", request.username, e);
            ApiError::Internal(MESSAGE_CREATE_FAILED.to_string())
        })?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: request.email,
            username: request.username,
            password_hash,
            role,
        };

        // A concurrent create can take the name between `exists` and here
        self.store.insert(&user).map_err(|e| {
            if e.downcast_ref::<DuplicateUser>().is_some() {
                info!("User {} registered concurrently", user.username);
                return ApiError::Conflict(MESSAGE_USER_EXISTS.to_string());
            }
            error!("Failed to insert user {}: {:#}", user.username, e);
            ApiError::Internal(MESSAGE_CREATE_FAILED.to_string())
        })?;

        info!("Created user: {} ({})", user.username, user.role);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory_store::MemoryUserStore;
    use axum::http::StatusCode;

    fn request(email: &str, username: &str, password: &str, role: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_request() {
        let ok = request("ncardozo@gapef.com.ar", "ncardozo", "anitaLAVAlaTina", "ATHLETE");
        assert_eq!(validate(&ok), Ok(UserRole::Athlete));

        let legacy = request("ncardozo@gapef.com.ar", "ncardozo", "x", "ATLETHE");
        assert_eq!(validate(&legacy), Ok(UserRole::Athlete));
    }

    #[test]
    fn test_validate_reports_each_failure() {
        let cases = [
            (request("NCARDOZO", "ncardozo", "1234asdf", "ATHLETE"), DETAIL_INVALID_EMAIL),
            (request("ncardozo@gapef.com.ar", "", "1234asdf", "ATHLETE"), DETAIL_INVALID_USERNAME),
            (request("ncardozo@gapef.com.ar", "ncardozo", "", "ATHLETE"), DETAIL_INVALID_PASSWORD),
            (request("ncardozo@gapef.com.ar", "ncardozo", "1234asdf", "undefined"), DETAIL_INVALID_ROLE),
        ];

        for (req, detail) in cases {
            assert_eq!(validate(&req), Err(vec![detail.to_string()]));
        }
    }

    #[test]
    fn test_validate_collects_all_failures() {
        let details = validate(&request("nope", "", "", "TRAINER")).unwrap_err();
        assert_eq!(
            details,
            vec![
                DETAIL_INVALID_EMAIL,
                DETAIL_INVALID_USERNAME,
                DETAIL_INVALID_PASSWORD,
                DETAIL_INVALID_ROLE,
            ]
        );
    }

    #[test]
    fn test_create_hashes_password() {
        let store = Arc::new(MemoryUserStore::new());
        let service = UserService::new(store.clone(), 4);

        let user = service
            .create(request("joan@gapef.com.ar", "joan", "secreto", "COACH"))
            .unwrap();

        assert_ne!(user.password_hash, "secreto");
        assert!(bcrypt::verify("secreto", &user.password_hash).unwrap());
        assert_eq!(store.find_by_username("joan").unwrap().unwrap(), user);
    }

    #[test]
    fn test_create_duplicate_is_conflict() {
        let store = Arc::new(MemoryUserStore::new());
        let service = UserService::new(store.clone(), 4);
        service
            .create(request("joan@gapef.com.ar", "joan", "secreto", "COACH"))
            .unwrap();

        let same_name = service
            .create(request("other@gapef.com.ar", "joan", "secreto", "COACH"))
            .unwrap_err();
        assert_eq!(same_name.status(), StatusCode::CONFLICT);

        let same_email = service
            .create(request("joan@gapef.com.ar", "other", "secreto", "COACH"))
            .unwrap_err();
        assert_eq!(same_email.status(), StatusCode::CONFLICT);

        assert_eq!(store.len(), 1);
    }

    /// Reports every name as free, like a store that lost the race
    struct StaleExists(MemoryUserStore);

    impl UserStore for StaleExists {
        fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
            self.0.find_by_username(username)
        }
        fn list(&self, page: u64, size: u64) -> anyhow::Result<Vec<User>> {
            self.0.list(page, size)
        }
        fn insert(&self, user: &User) -> anyhow::Result<()> {
            self.0.insert(user)
        }
        fn exists(&self, _username: &str, _email: &str) -> anyhow::Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn test_duplicate_caught_at_insert_is_conflict() {
        let store = Arc::new(StaleExists(MemoryUserStore::new()));
        let service = UserService::new(store.clone(), 4);
        service
            .create(request("joan@gapef.com.ar", "joan", "secreto", "COACH"))
            .unwrap();

        let err = service
            .create(request("joan@gapef.com.ar", "joan", "secreto", "COACH"))
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), MESSAGE_USER_EXISTS);
        assert_eq!(store.0.len(), 1);
    }

    #[test]
    fn test_list_hides_passwords() {
        let store = Arc::new(MemoryUserStore::new());
        let service = UserService::new(store, 4);
        service
            .create(request("joan@gapef.com.ar", "joan", "secreto", "COACH"))
            .unwrap();

        let listed = service.list(0, 0).unwrap();
        assert_eq!(listed.len(), 1);
        let json = serde_json::to_value(&listed[0]).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "COACH");
    }
}
