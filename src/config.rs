//! Process configuration: command line plus environment

use crate::auth::{jwt::DEFAULT_TOKEN_TTL_SECS, models::CreateUserRequest};
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "swim-metrics", about = "Swimming team metrics backend")]
pub struct Cli {
    /// Load variables from ./.env before reading the configuration
    #[arg(long)]
    pub dev: bool,

    /// Address the HTTP server binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub auth_db_path: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    /// Coach account created at startup when the store does not have it yet
    pub bootstrap_coach: Option<CreateUserRequest>,
}

impl AppConfig {
    pub fn from_env(bind_addr: String) -> Result<Self> {
        Self::from_lookup(bind_addr, |key| env::var(key).ok())
    }

    fn from_lookup(bind_addr: String, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must be set to a non-empty value");
        }

        let token_ttl_secs = match lookup("TOKEN_TTL_SECS") {
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|&s| s > 0)
                .with_context(|| format!("Invalid TOKEN_TTL_SECS: {v}"))?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|c| (4..=31).contains(c))
                .with_context(|| format!("Invalid BCRYPT_COST: {v}"))?,
            None => bcrypt::DEFAULT_COST,
        };

        let bootstrap_coach = match (
            lookup("BOOTSTRAP_COACH_USERNAME"),
            lookup("BOOTSTRAP_COACH_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(CreateUserRequest {
                email: lookup("BOOTSTRAP_COACH_EMAIL")
                    .unwrap_or_else(|| format!("{username}@gapef.com.ar")),
                username,
                password,
                role: "COACH".to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            auth_db_path: resolve_data_path(lookup("AUTH_DB_PATH"), "swim_metrics_auth.db"),
            token_ttl: chrono::Duration::seconds(token_ttl_secs),
            bcrypt_cost,
            bootstrap_coach,
        })
    }
}

/// Relative paths resolve against the crate directory, not the caller's cwd
fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return base.join(default_filename).to_string_lossy().to_string();
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    base.join(p).to_string_lossy().to_string()
}

/// In development the `.env` file is mandatory
pub fn load_env(dev: bool) -> Result<()> {
    if dev {
        dotenv::from_filename(".env").context("cannot read .env file")?;
    }
    Ok(())
}
