//! Authentication Module
//! Mission: Issue session tokens at login and gate protected routes by role

pub mod api;
pub mod jwt;
pub mod memory_store;
pub mod middleware;
pub mod models;
pub mod service;
pub mod user_store;
pub mod validator;

pub use jwt::JwtHandler;
pub use memory_store::MemoryUserStore;
pub use middleware::{auth_middleware, role_middleware, AuthError, RoleGate};
pub use service::AuthService;
pub use user_store::{SqliteUserStore, UserStore};
pub use validator::TokenValidator;
