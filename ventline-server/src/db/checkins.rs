use chrono::NaiveDate;
use shared::checkin::DailyCheckin;

use super::SessionDb;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CheckinRow {
    pub check_date: NaiveDate,
    pub mood_score: i16,
    pub emotion: String,
    pub note: Option<String>,
    pub updated_at: i64,
}

impl From<CheckinRow> for DailyCheckin {
    fn from(row: CheckinRow) -> Self {
        DailyCheckin {
            check_date: row.check_date,
            mood_score: row.mood_score,
            emotion: row.emotion,
            note: row.note,
            updated_at: row.updated_at,
        }
    }
}

pub struct UpsertCheckin<'a> {
    pub user_id: &'a str,
    pub check_date: NaiveDate,
    pub mood_score: i16,
    pub emotion: &'a str,
    pub note: Option<&'a str>,
    pub now: i64,
}

/// Insert today's check-in, or overwrite it if one already exists
pub async fn upsert(db: &SessionDb, c: &UpsertCheckin<'_>) -> Result<CheckinRow, sqlx::Error> {
    sqlx::query_as::<_, CheckinRow>(
        "INSERT INTO daily_checkins (user_id, check_date, mood_score, emotion, note, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6)
         ON CONFLICT (user_id, check_date) DO UPDATE SET
            mood_score = EXCLUDED.mood_score,
            emotion = EXCLUDED.emotion,
            note = EXCLUDED.note,
            updated_at = EXCLUDED.updated_at
         RETURNING check_date, mood_score, emotion, note, updated_at",
    )
    .bind(c.user_id)
    .bind(c.check_date)
    .bind(c.mood_score)
    .bind(c.emotion)
    .bind(c.note)
    .bind(c.now)
    .fetch_one(db.pool())
    .await
}

pub async fn find_by_date(
    db: &SessionDb,
    user_id: &str,
    check_date: NaiveDate,
) -> Result<Option<CheckinRow>, sqlx::Error> {
    sqlx::query_as::<_, CheckinRow>(
        "SELECT check_date, mood_score, emotion, note, updated_at
            FROM daily_checkins
            WHERE user_id = $1 AND check_date = $2",
    )
    .bind(user_id)
    .bind(check_date)
    .fetch_optional(db.pool())
    .await
}

/// Check-ins in `[from, to]`, oldest first
pub async fn list_range(
    db: &SessionDb,
    user_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<CheckinRow>, sqlx::Error> {
    sqlx::query_as::<_, CheckinRow>(
        "SELECT check_date, mood_score, emotion, note, updated_at
            FROM daily_checkins
            WHERE user_id = $1 AND check_date BETWEEN $2 AND $3
            ORDER BY check_date ASC, id ASC",
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(db.pool())
    .await
}

pub async fn count_for_user(db: &SessionDb, user_id: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM daily_checkins WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(db.pool())
        .await?;
    Ok(count)
}
