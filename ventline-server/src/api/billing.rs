//! Billing endpoints: Stripe checkout session, billing portal

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};

use crate::auth::SessionIdentity;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::{db, stripe};

use super::ApiResult;

/// POST /api/billing/checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<Value> {
    // Create or reuse Stripe customer
    let customer_id =
        match db::subscriptions::find_stripe_customer(&state.session_db, &identity.user_id).await? {
            Some(cid) => cid,
            None => {
                let cid = stripe::create_customer(
                    &state.stripe.secret_key,
                    identity.email.as_deref(),
                    &identity.user_id,
                )
                .await
                .map_err(ServiceError::Stripe)?;
                db::subscriptions::set_stripe_customer(
                    &state.service_db,
                    &identity.user_id,
                    &cid,
                    shared::util::now_millis(),
                )
                .await?;
                cid
            }
        };

    let success_url = format!("{}/account?checkout=success", state.app_base_url);
    let cancel_url = format!("{}/account?checkout=canceled", state.app_base_url);
    let checkout_url = stripe::create_checkout_session(
        &state.stripe.secret_key,
        &customer_id,
        &state.stripe.price_id,
        &identity.user_id,
        &success_url,
        &cancel_url,
    )
    .await
    .map_err(ServiceError::Stripe)?;

    tracing::info!(user_id = %identity.user_id, "Checkout session created");

    Ok(Json(json!({ "checkoutUrl": checkout_url })))
}

/// POST /api/billing/portal
pub async fn billing_portal(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<Value> {
    let customer_id =
        db::subscriptions::find_stripe_customer(&state.session_db, &identity.user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::StripeCustomerMissing))?;

    let return_url = format!("{}/account", state.app_base_url);
    let url =
        stripe::create_billing_portal_session(&state.stripe.secret_key, &customer_id, &return_url)
            .await
            .map_err(ServiceError::Stripe)?;

    Ok(Json(json!({ "url": url })))
}
