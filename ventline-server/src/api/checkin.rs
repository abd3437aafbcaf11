//! Daily check-in endpoints (premium)

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};
use shared::checkin::{CheckinRequest, DailyCheckin};
use shared::util::{now_millis, utc_day};

use crate::auth::SessionIdentity;
use crate::db;
use crate::state::AppState;

use super::extract::ValidatedJson;
use super::{ApiResult, gate};

/// POST /api/checkin/daily
///
/// The body is validated by the extractor, so malformed input is rejected
/// before any entitlement lookup.
pub async fn submit_daily(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    ValidatedJson(req): ValidatedJson<CheckinRequest>,
) -> ApiResult<Value> {
    let access = gate::require_access(&state, &identity).await?;

    let now = now_millis();
    let note = req.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let row = db::checkins::upsert(
        &state.session_db,
        &db::checkins::UpsertCheckin {
            user_id: &identity.user_id,
            check_date: utc_day(now),
            mood_score: req.mood_score,
            emotion: req.emotion.trim(),
            note,
            now,
        },
    )
    .await?;

    tracing::info!(
        user_id = %identity.user_id,
        check_date = %row.check_date,
        mood_score = row.mood_score,
        "Daily check-in saved"
    );

    Ok(Json(json!({
        "checkin": DailyCheckin::from(row),
        "access": access,
    })))
}

/// GET /api/checkin/today
pub async fn get_today(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<Value> {
    let access = gate::require_access(&state, &identity).await?;

    let today = utc_day(now_millis());
    let checkin = db::checkins::find_by_date(&state.session_db, &identity.user_id, today)
        .await?
        .map(DailyCheckin::from);

    Ok(Json(json!({
        "date": today,
        "checkin": checkin,
        "access": access,
    })))
}
