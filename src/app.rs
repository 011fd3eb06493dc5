//! Application state and router composition
//!
//! `AppState` is built once at startup and shared by reference with every
//! request; nothing in it is mutated afterwards.

use crate::auth::{
    api as auth_api, auth_middleware,
    middleware::{HEALTH_PATH, LOGIN_PATH},
    models::UserRole,
    role_middleware, AuthService, JwtHandler, RoleGate, TokenValidator, UserStore,
};
use crate::middleware::request_logging;
use crate::users::{api as users_api, UserService};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub validator: TokenValidator,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, jwt: Arc<JwtHandler>, hash_cost: u32) -> Self {
        Self {
            auth: Arc::new(AuthService::new(store.clone(), jwt.clone())),
            users: Arc::new(UserService::new(store, hash_cost)),
            validator: TokenValidator::new(jwt),
        }
    }
}

/// Interceptors run outermost first: request logging, authentication gate,
/// then the coach gate on `/users`.
pub fn router(state: AppState) -> Router {
    let coach_gate = RoleGate::new(state.validator.clone(), UserRole::Coach);

    let user_routes = Router::new()
        .route(
            "/users",
            get(users_api::list_users).post(users_api::create_user),
        )
        .route_layer(middleware::from_fn_with_state(coach_gate, role_middleware));

    Router::new()
        .route(LOGIN_PATH, post(auth_api::login))
        .route(HEALTH_PATH, get(health_check))
        .merge(user_routes)
        .layer(middleware::from_fn_with_state(
            state.validator.clone(),
            auth_middleware,
        ))
        .layer(middleware::from_fn(request_logging))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}
