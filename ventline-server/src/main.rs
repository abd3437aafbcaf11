//! ventline-server: API backend for the Ventline mood journal
//!
//! - Daily check-ins, weekly summaries and insights (premium, entitlement-gated)
//! - Entitlement resolution: lazy 3-day trial, Stripe-backed premium
//! - Stripe checkout / billing portal and webhook ingestion

mod api;
mod auth;
mod config;
mod db;
mod entitlement;
mod error;
mod insights;
mod state;
mod stripe;

use config::Config;
use error::BoxError;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ventline_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting ventline-server (env: {})", config.environment);

    let state = AppState::new(&config).await?;
    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("ventline-server HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ventline-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
