//! User management for coaches

pub mod api;
pub mod service;

pub use service::UserService;
