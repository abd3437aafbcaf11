//! GET /api/weekly (premium)

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};
use shared::checkin::DailyCheckin;
use shared::util::{now_millis, utc_day};

use crate::auth::SessionIdentity;
use crate::state::AppState;
use crate::{db, insights};

use super::{ApiResult, gate};

/// Summary of the last 7 UTC days, today included
pub async fn get_weekly(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<Value> {
    let access = gate::require_access(&state, &identity).await?;

    let (week_start, week_end) = insights::window(utc_day(now_millis()), insights::WEEK_DAYS);
    let rows: Vec<DailyCheckin> =
        db::checkins::list_range(&state.session_db, &identity.user_id, week_start, week_end)
            .await?
            .into_iter()
            .map(DailyCheckin::from)
            .collect();

    let summary = insights::summarize_week(&rows, week_start, week_end);

    Ok(Json(json!({
        "summary": summary,
        "checkins": rows,
        "access": access,
    })))
}
