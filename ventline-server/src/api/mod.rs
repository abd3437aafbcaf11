//! API routes for ventline-server

pub mod access;
pub mod account;
pub mod billing;
pub mod checkin;
pub mod extract;
pub mod gate;
pub mod health;
pub mod insights;
pub mod stripe_webhook;
pub mod weekly;

use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::session_auth_middleware;
use crate::error::ServiceError;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, ServiceError>;

/// Browser access is limited to the web app's origin
fn cors_layer(app_base_url: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
    match HeaderValue::from_str(app_base_url) {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(%e, app_base_url, "Invalid APP_BASE_URL, cross-origin requests disabled");
            cors
        }
    }
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.app_base_url);

    // User API (session JWT)
    let user = Router::new()
        .route("/api/access", get(access::get_access))
        .route("/api/account", get(account::get_account))
        .route("/api/checkin/daily", post(checkin::submit_daily))
        .route("/api/checkin/today", get(checkin::get_today))
        .route("/api/weekly", get(weekly::get_weekly))
        .route("/api/insights", get(insights::get_insights))
        .route("/api/billing/checkout", post(billing::create_checkout))
        .route("/api/billing/portal", post(billing::billing_portal))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_auth_middleware,
        ));

    // Stripe webhook (signature-verified, raw body)
    let webhook = Router::new().route("/stripe/webhook", post(stripe_webhook::handle_webhook));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(user)
        .merge(webhook)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
