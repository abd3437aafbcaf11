//! Stripe webhook handler
//!
//! POST /stripe/webhook: raw body, signature-verified, deduplicated by event id.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use shared::SubscriptionStatus;

use crate::db::subscriptions::{self, LinkSubscription};
use crate::db::{ServiceDb, webhook_events};
use crate::error::BoxError;
use crate::state::AppState;
use crate::stripe;

/// Writes a webhook event can cause (elevated store)
#[async_trait]
pub trait WebhookStore: Send + Sync {
    /// `false` when the event id was already recorded
    async fn record_event(&self, event_id: &str, event_type: &str, now: i64)
    -> Result<bool, BoxError>;

    async fn forget_event(&self, event_id: &str) -> Result<(), BoxError>;

    async fn link_subscription(&self, link: &LinkSubscription<'_>) -> Result<(), BoxError>;

    /// Rows touched
    async fn update_subscription(
        &self,
        stripe_subscription_id: &str,
        status: Option<&str>,
        current_period_end: Option<i64>,
        now: i64,
    ) -> Result<u64, BoxError>;
}

#[async_trait]
impl WebhookStore for ServiceDb {
    async fn record_event(
        &self,
        event_id: &str,
        event_type: &str,
        now: i64,
    ) -> Result<bool, BoxError> {
        Ok(webhook_events::record(self, event_id, event_type, now).await?)
    }

    async fn forget_event(&self, event_id: &str) -> Result<(), BoxError> {
        Ok(webhook_events::forget(self, event_id).await?)
    }

    async fn link_subscription(&self, link: &LinkSubscription<'_>) -> Result<(), BoxError> {
        Ok(subscriptions::link_subscription(self, link).await?)
    }

    async fn update_subscription(
        &self,
        stripe_subscription_id: &str,
        status: Option<&str>,
        current_period_end: Option<i64>,
        now: i64,
    ) -> Result<u64, BoxError> {
        Ok(subscriptions::update_by_stripe_subscription(
            self,
            stripe_subscription_id,
            status,
            current_period_end,
            now,
        )
        .await?)
    }
}

/// Handle incoming Stripe webhook events
///
/// Must receive raw body (not JSON) for HMAC signature verification.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(sig_header) = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    else {
        tracing::warn!("Missing Stripe-Signature header");
        return StatusCode::BAD_REQUEST;
    };

    if let Err(e) =
        stripe::verify_webhook_signature(&body, sig_header, &state.stripe.webhook_secret)
    {
        tracing::warn!(error = %e, "Webhook signature verification failed");
        return StatusCode::BAD_REQUEST;
    }

    let event: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(%e, "Failed to parse webhook JSON");
            return StatusCode::BAD_REQUEST;
        }
    };

    process_event(&state.service_db, &event, shared::util::now_millis()).await
}

/// Dedupe and apply a verified event.
///
/// A failed apply releases the event id and answers 500 so Stripe's retry
/// is processed again.
pub async fn process_event<S>(store: &S, event: &Value, now: i64) -> StatusCode
where
    S: WebhookStore + ?Sized,
{
    let event_type = event["type"].as_str().unwrap_or("");
    let Some(event_id) = event["id"].as_str() else {
        tracing::warn!("Webhook event missing id");
        return StatusCode::BAD_REQUEST;
    };
    tracing::info!(event_id, event_type, "Received Stripe webhook");

    match store.record_event(event_id, event_type, now).await {
        Ok(false) => {
            tracing::info!(event_id, "Duplicate webhook event, skipping");
            return StatusCode::OK;
        }
        Ok(true) => {}
        Err(e) => {
            tracing::error!(%e, "DB error recording webhook event");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    }

    match dispatch(store, event_type, &event["data"]["object"], now).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::error!(%e, event_id, event_type, "Failed to apply webhook event");
            if let Err(e) = store.forget_event(event_id).await {
                tracing::error!(%e, event_id, "Failed to release webhook event for retry");
            }
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn dispatch<S>(store: &S, event_type: &str, obj: &Value, now: i64) -> Result<(), BoxError>
where
    S: WebhookStore + ?Sized,
{
    match event_type {
        "checkout.session.completed" => checkout_completed(store, obj, now).await,
        "customer.subscription.created" | "customer.subscription.updated" => {
            subscription_changed(store, obj, now).await
        }
        "customer.subscription.deleted" => {
            let Some(sub_id) = obj["id"].as_str() else {
                return Ok(());
            };
            let rows = store
                .update_subscription(sub_id, Some(SubscriptionStatus::Canceled.as_db()), None, now)
                .await?;
            tracing::info!(subscription_id = sub_id, rows, "Subscription canceled");
            Ok(())
        }
        "invoice.payment_failed" => {
            let Some(sub_id) = stripe::invoice_subscription_id(obj) else {
                return Ok(());
            };
            let rows = store
                .update_subscription(sub_id, Some(SubscriptionStatus::PastDue.as_db()), None, now)
                .await?;
            tracing::info!(subscription_id = sub_id, rows, "Subscription past due");
            Ok(())
        }
        "invoice.paid" => {
            let (Some(sub_id), Some(period_end)) = (
                stripe::invoice_subscription_id(obj),
                stripe::invoice_period_end_millis(obj),
            ) else {
                return Ok(());
            };
            store
                .update_subscription(sub_id, None, Some(period_end), now)
                .await?;
            tracing::info!(subscription_id = sub_id, period_end, "Invoice paid, period updated");
            Ok(())
        }
        _ => {
            tracing::debug!(event_type, "Unhandled webhook event type");
            Ok(())
        }
    }
}

/// checkout.session.completed: activate the user named by `client_reference_id`
async fn checkout_completed<S>(store: &S, obj: &Value, now: i64) -> Result<(), BoxError>
where
    S: WebhookStore + ?Sized,
{
    let Some(user_id) = obj["client_reference_id"].as_str().filter(|s| !s.is_empty()) else {
        tracing::warn!("checkout.session.completed missing client_reference_id");
        return Ok(());
    };

    let subscription_id = obj["subscription"].as_str();
    store
        .link_subscription(&LinkSubscription {
            user_id,
            status: SubscriptionStatus::Active.as_db(),
            customer_id: obj["customer"].as_str(),
            subscription_id,
            // kept if subscription events already linked this subscription
            current_period_end: None,
            now,
        })
        .await?;

    tracing::info!(user_id, subscription_id, "Subscription activated via Stripe checkout");
    Ok(())
}

/// customer.subscription.created / updated: sync status and period end.
///
/// Stripe may deliver these before checkout completes; the user id stamped
/// in the subscription metadata then links the row.
async fn subscription_changed<S>(store: &S, obj: &Value, now: i64) -> Result<(), BoxError>
where
    S: WebhookStore + ?Sized,
{
    let Some(sub_id) = obj["id"].as_str() else {
        return Ok(());
    };
    let status = obj["status"].as_str();
    let period_end = stripe::subscription_period_end_millis(obj);

    let rows = store
        .update_subscription(sub_id, status, period_end, now)
        .await?;
    if rows > 0 {
        tracing::info!(subscription_id = sub_id, status, "Subscription updated");
        return Ok(());
    }

    let (Some(user_id), Some(status)) = (stripe::subscription_user_id(obj), status) else {
        tracing::debug!(subscription_id = sub_id, "No row linked to subscription");
        return Ok(());
    };
    store
        .link_subscription(&LinkSubscription {
            user_id,
            status,
            customer_id: obj["customer"].as_str(),
            subscription_id: Some(sub_id),
            current_period_end: period_end,
            now,
        })
        .await?;
    tracing::info!(user_id, subscription_id = sub_id, status, "Subscription linked from metadata");
    Ok(())
}
