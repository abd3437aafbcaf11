use super::ServiceDb;

/// Record a webhook event id. Returns `false` when it was already processed.
///
/// Insert-first (instead of select-then-insert) so two concurrent deliveries
/// of the same event cannot both pass.
pub async fn record(
    db: &ServiceDb,
    event_id: &str,
    event_type: &str,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO processed_webhook_events (event_id, event_type, processed_at)
         VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
    )
    .bind(event_id)
    .bind(event_type)
    .bind(now)
    .execute(db.pool())
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Drop a recorded event so a Stripe retry is processed again
pub async fn forget(db: &ServiceDb, event_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM processed_webhook_events WHERE event_id = $1")
        .bind(event_id)
        .execute(db.pool())
        .await?;
    Ok(())
}
