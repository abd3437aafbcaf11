//! Stripe integration via REST API (no SDK dependency)

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use crate::error::BoxError;

const API_BASE: &str = "https://api.stripe.com/v1";

/// Maximum age of a signed webhook before it is rejected as a replay
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WebhookSignatureError {
    #[error("Invalid Stripe-Signature header")]
    MalformedHeader,
    #[error("Invalid signature hex")]
    InvalidHex,
    #[error("Webhook signature mismatch")]
    Mismatch,
    #[error("Invalid timestamp")]
    InvalidTimestamp,
    #[error("Webhook timestamp outside tolerance")]
    Stale,
}

async fn post_form(
    secret_key: &str,
    path: &str,
    form: &[(&str, &str)],
) -> Result<Value, BoxError> {
    let client = reqwest::Client::new();
    let resp: Value = client
        .post(format!("{API_BASE}{path}"))
        .basic_auth(secret_key, None::<&str>)
        .form(form)
        .send()
        .await?
        .json()
        .await?;
    Ok(resp)
}

/// Create a Stripe Customer
pub async fn create_customer(
    secret_key: &str,
    email: Option<&str>,
    user_id: &str,
) -> Result<String, BoxError> {
    let mut form = vec![("metadata[user_id]", user_id)];
    if let Some(email) = email {
        form.push(("email", email));
    }
    let resp = post_form(secret_key, "/customers", &form).await?;

    resp["id"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| format!("Stripe create_customer failed: {resp}").into())
}

/// Create a Stripe Checkout Session (subscription mode)
///
/// `client_reference_id` carries the user id back in `checkout.session.completed`.
pub async fn create_checkout_session(
    secret_key: &str,
    customer_id: &str,
    price_id: &str,
    user_id: &str,
    success_url: &str,
    cancel_url: &str,
) -> Result<String, BoxError> {
    let resp = post_form(
        secret_key,
        "/checkout/sessions",
        &[
            ("customer", customer_id),
            ("mode", "subscription"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("client_reference_id", user_id),
            ("subscription_data[metadata][user_id]", user_id),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("allow_promotion_codes", "true"),
        ],
    )
    .await?;

    resp["url"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| format!("Stripe create_checkout failed: {resp}").into())
}

/// Create a Stripe Billing Portal session
pub async fn create_billing_portal_session(
    secret_key: &str,
    customer_id: &str,
    return_url: &str,
) -> Result<String, BoxError> {
    let resp = post_form(
        secret_key,
        "/billing_portal/sessions",
        &[("customer", customer_id), ("return_url", return_url)],
    )
    .await?;

    resp["url"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| format!("Stripe billing portal failed: {resp}").into())
}

/// Verify Stripe webhook signature (HMAC-SHA256 over `"{t}.{payload}"`)
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), WebhookSignatureError> {
    verify_webhook_signature_at(payload, sig_header, secret, chrono::Utc::now().timestamp())
}

fn verify_webhook_signature_at(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now_secs: i64,
) -> Result<(), WebhookSignatureError> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    if timestamp.is_empty() || signatures.is_empty() {
        return Err(WebhookSignatureError::MalformedHeader);
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookSignatureError::Mismatch)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // Stripe sends one v1 entry per active secret during rotation
    let mut matched = false;
    for signature in signatures {
        let sig_bytes = hex::decode(signature).map_err(|_| WebhookSignatureError::InvalidHex)?;
        if mac.clone().verify_slice(&sig_bytes).is_ok() {
            matched = true;
            break;
        }
    }
    if !matched {
        return Err(WebhookSignatureError::Mismatch);
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| WebhookSignatureError::InvalidTimestamp)?;
    if (now_secs - ts).abs() > WEBHOOK_TOLERANCE_SECS {
        return Err(WebhookSignatureError::Stale);
    }

    Ok(())
}

/// Stripe timestamps are Unix seconds; out-of-range values are dropped
fn secs_to_millis(secs: i64) -> Option<i64> {
    secs.checked_mul(1000)
}

/// `current_period_end` of a subscription object in millis
///
/// Newer API versions moved the field onto subscription items.
pub fn subscription_period_end_millis(subscription: &Value) -> Option<i64> {
    subscription["current_period_end"]
        .as_i64()
        .or_else(|| subscription["items"]["data"][0]["current_period_end"].as_i64())
        .and_then(secs_to_millis)
}

/// Period end of the first invoice line in millis
pub fn invoice_period_end_millis(invoice: &Value) -> Option<i64> {
    invoice["lines"]["data"][0]["period"]["end"]
        .as_i64()
        .and_then(secs_to_millis)
}

/// User id stamped on a subscription at checkout (`subscription_data[metadata]`)
pub fn subscription_user_id(subscription: &Value) -> Option<&str> {
    subscription["metadata"]["user_id"]
        .as_str()
        .filter(|s| !s.is_empty())
}

/// Subscription id an invoice belongs to
pub fn invoice_subscription_id(invoice: &Value) -> Option<&str> {
    invoice["subscription"]
        .as_str()
        .or_else(|| invoice["parent"]["subscription_details"]["subscription"].as_str())
}

#[cfg(test)]
pub(crate) fn sign_for_tests(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    let sig = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={sig}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test";
    const NOW: i64 = 1_760_000_000;

    #[test]
    fn accepts_valid_signature() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = sign_for_tests(payload, SECRET, NOW);
        assert_eq!(verify_webhook_signature_at(payload, &header, SECRET, NOW + 10), Ok(()));
    }

    #[test]
    fn accepts_any_matching_v1_entry() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = sign_for_tests(payload, SECRET, NOW);
        let rotated = header.replacen("v1=", &format!("v1={},v1=", "00".repeat(32)), 1);
        assert_eq!(verify_webhook_signature_at(payload, &rotated, SECRET, NOW), Ok(()));
    }

    #[test]
    fn rejects_tampered_payload() {
        let header = sign_for_tests(br#"{"id":"evt_1"}"#, SECRET, NOW);
        assert_eq!(
            verify_webhook_signature_at(br#"{"id":"evt_2"}"#, &header, SECRET, NOW),
            Err(WebhookSignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_wrong_secret() {
        let payload = b"{}";
        let header = sign_for_tests(payload, "whsec_other", NOW);
        assert_eq!(
            verify_webhook_signature_at(payload, &header, SECRET, NOW),
            Err(WebhookSignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_stale_timestamp() {
        let payload = b"{}";
        let header = sign_for_tests(payload, SECRET, NOW);
        assert_eq!(
            verify_webhook_signature_at(payload, &header, SECRET, NOW + WEBHOOK_TOLERANCE_SECS + 1),
            Err(WebhookSignatureError::Stale)
        );
    }

    #[test]
    fn rejects_malformed_header() {
        assert_eq!(
            verify_webhook_signature_at(b"{}", "v1=abcd", SECRET, NOW),
            Err(WebhookSignatureError::MalformedHeader)
        );
        assert_eq!(
            verify_webhook_signature_at(b"{}", "t=1,v1=zz", SECRET, NOW),
            Err(WebhookSignatureError::InvalidHex)
        );
    }

    #[test]
    fn period_end_from_top_level_or_first_item() {
        assert_eq!(
            subscription_period_end_millis(&json!({ "current_period_end": 1_700_000_000 })),
            Some(1_700_000_000_000)
        );
        let nested = json!({ "items": { "data": [{ "current_period_end": 1_800_000_000 }] } });
        assert_eq!(subscription_period_end_millis(&nested), Some(1_800_000_000_000));
        assert_eq!(subscription_period_end_millis(&json!({})), None);
    }

    #[test]
    fn user_id_from_subscription_metadata() {
        let sub = json!({ "id": "sub_1", "metadata": { "user_id": "user-7" } });
        assert_eq!(subscription_user_id(&sub), Some("user-7"));
        assert_eq!(subscription_user_id(&json!({ "metadata": { "user_id": "" } })), None);
        assert_eq!(subscription_user_id(&json!({})), None);
    }

    #[test]
    fn period_end_overflow_is_ignored() {
        assert_eq!(
            subscription_period_end_millis(&json!({ "current_period_end": i64::MAX })),
            None
        );
        let invoice = json!({ "lines": { "data": [{ "period": { "end": i64::MIN } }] } });
        assert_eq!(invoice_period_end_millis(&invoice), None);
    }

    #[test]
    fn invoice_helpers() {
        let invoice = json!({
            "subscription": "sub_1",
            "lines": { "data": [{ "period": { "start": 1, "end": 1_700_000_000 } }] }
        });
        assert_eq!(invoice_subscription_id(&invoice), Some("sub_1"));
        assert_eq!(invoice_period_end_millis(&invoice), Some(1_700_000_000_000));

        let newer = json!({ "parent": { "subscription_details": { "subscription": "sub_2" } } });
        assert_eq!(invoice_subscription_id(&newer), Some("sub_2"));
        assert_eq!(invoice_period_end_millis(&newer), None);
    }
}
