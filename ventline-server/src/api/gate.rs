//! Premium gate shared by the check-in, weekly and insights handlers

use shared::AccessResult;
use shared::error::{AppError, ErrorCode};

use crate::auth::SessionIdentity;
use crate::entitlement;
use crate::state::AppState;

/// Resolve the caller's access right now
pub async fn resolve_for(state: &AppState, user_id: &str) -> AccessResult {
    entitlement::resolve_access(
        &state.session_db,
        &state.service_db,
        user_id,
        shared::util::now_millis(),
    )
    .await
}

/// Resolve access and reject with 402 when the user has none
pub async fn require_access(
    state: &AppState,
    identity: &SessionIdentity,
) -> Result<AccessResult, AppError> {
    let access = resolve_for(state, &identity.user_id).await;
    if !access.has_access {
        tracing::info!(
            user_id = %identity.user_id,
            reason = ?access.reason,
            "Premium feature denied"
        );
    }
    gate(access)
}

/// Pass granted access through; otherwise `SubscriptionRequired`
///
/// The denial carries only the generic message plus the access payload.
pub fn gate(access: AccessResult) -> Result<AccessResult, AppError> {
    if access.has_access {
        return Ok(access);
    }
    Err(AppError::new(ErrorCode::SubscriptionRequired)
        .with_detail("access", serde_json::to_value(&access).unwrap_or_default()))
}
