//! GET /api/account

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};

use crate::auth::SessionIdentity;
use crate::db;
use crate::state::AppState;

use super::{ApiResult, gate};

/// Account overview; available regardless of entitlement
pub async fn get_account(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<Value> {
    let access = gate::resolve_for(&state, &identity.user_id).await;
    let total_checkins = db::checkins::count_for_user(&state.session_db, &identity.user_id).await?;
    let customer =
        db::subscriptions::find_stripe_customer(&state.session_db, &identity.user_id).await?;

    Ok(Json(json!({
        "userId": identity.user_id,
        "email": identity.email,
        "totalCheckins": total_checkins,
        "hasBillingCustomer": customer.is_some(),
        "access": access,
    })))
}
