//! Swim Metrics - swimming team backend
//! Mission: Authenticate team members and let coaches manage the roster

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swim_metrics_backend::{
    app::{self, AppState},
    auth::{JwtHandler, SqliteUserStore, UserStore},
    config::{self, AppConfig, Cli},
    error::ApiError,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize environment and logging
    config::load_env(cli.dev)?;
    init_tracing();

    if cli.dev {
        info!("Environment set for development");
    }

    let config = AppConfig::from_env(cli.bind)?;

    let store: Arc<dyn UserStore> = Arc::new(SqliteUserStore::new(&config.auth_db_path)?);
    let jwt = Arc::new(JwtHandler::with_validity(&config.jwt_secret, config.token_ttl));
    let state = AppState::new(store, jwt, config.bcrypt_cost);

    info!(
        "Authentication initialized (token validity {}s)",
        config.token_ttl.num_seconds()
    );

    if let Some(coach) = config.bootstrap_coach.clone() {
        let username = coach.username.clone();
        match state.users.create(coach) {
            Ok(_) => info!("Bootstrap coach {} created", username),
            Err(ApiError::Conflict(_)) => debug!("Bootstrap coach {} already present", username),
            Err(e) => return Err(anyhow::anyhow!("Failed to create bootstrap coach: {e}")),
        }
    }

    let app = app::router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter support
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swim_metrics_backend=debug,swim_metrics=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
