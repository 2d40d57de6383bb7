//! Warden API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod seed;
mod state;

use tracing::info;
use warden_core::AppError;

use crate::api_config::{ApiCommand, ApiConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool = api_services::connect_and_migrate(&config.database_url).await?;

    match config.command {
        ApiCommand::Migrate => {
            info!("database migrations applied successfully");
            Ok(())
        }
        ApiCommand::Seed => {
            let app_state = api_services::build_app_state(pool, &config).await?;
            seed::run(&app_state, config.seed_admin.as_ref()).await
        }
        ApiCommand::Sync => {
            let app_state = api_services::build_app_state(pool, &config).await?;
            let summary = app_state.mirror_sync_service.sync_all().await?;
            info!(
                permissions_synced = summary.permissions_synced,
                roles_synced = summary.roles_synced,
                failures = summary.failures.len(),
                "legacy mirror synced"
            );
            Ok(())
        }
        ApiCommand::Serve => serve(pool, config).await,
    }
}

async fn serve(pool: sqlx::PgPool, config: ApiConfig) -> Result<(), AppError> {
    let session_layer =
        api_services::build_postgres_session_layer(pool.clone(), config.cookie_secure).await?;
    let app_state = api_services::build_app_state(pool, &config).await?;
    let app = api_router::build_router(app_state, &config.frontend_url, session_layer)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind API listener: {error}")))?;

    info!(%address, "warden-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
