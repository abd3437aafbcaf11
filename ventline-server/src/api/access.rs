//! GET /api/access

use axum::{Extension, Json, extract::State};
use shared::AccessResult;

use crate::auth::SessionIdentity;
use crate::state::AppState;

use super::gate;

/// Resolver result for the caller; never gated
pub async fn get_access(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> Json<AccessResult> {
    Json(gate::resolve_for(&state, &identity.user_id).await)
}
