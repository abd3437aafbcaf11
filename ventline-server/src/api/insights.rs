//! GET /api/insights?days=N (premium)

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};
use shared::checkin::{DailyCheckin, InsightsQuery};
use shared::util::{now_millis, utc_day};

use crate::auth::SessionIdentity;
use crate::state::AppState;
use crate::{db, insights};

use super::extract::ValidatedQuery;
use super::{ApiResult, gate};

pub async fn get_insights(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    ValidatedQuery(query): ValidatedQuery<InsightsQuery>,
) -> ApiResult<Value> {
    let access = gate::require_access(&state, &identity).await?;

    let days = query.days();
    let today = utc_day(now_millis());
    let (from, to) = insights::window(today, u64::from(days));
    let rows: Vec<DailyCheckin> =
        db::checkins::list_range(&state.session_db, &identity.user_id, from, to)
            .await?
            .into_iter()
            .map(DailyCheckin::from)
            .collect();

    Ok(Json(json!({
        "insights": insights::summarize_insights(&rows, today, days),
        "access": access,
    })))
}
