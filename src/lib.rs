//! Swim Metrics Backend Library
//!
//! Session-token authentication and user management for the swimming team
//! app. Exposes the router and its building blocks for the binary and tests.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod users;
