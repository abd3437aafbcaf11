use super::{ServiceDb, SessionDb};

/// Subscription row as stored
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SubscriptionRow {
    pub id: i64,
    pub user_id: String,
    pub status: String,
    pub trial_ends_at: Option<i64>,
    pub current_period_end: Option<i64>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub updated_at: i64,
}

/// Most recently updated row for a user (duplicates are tolerated, newest wins)
pub async fn find_latest(
    db: &SessionDb,
    user_id: &str,
) -> Result<Option<SubscriptionRow>, sqlx::Error> {
    sqlx::query_as::<_, SubscriptionRow>(
        "SELECT id, user_id, status, trial_ends_at, current_period_end,
            stripe_customer_id, stripe_subscription_id, updated_at
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY updated_at DESC, id DESC
            LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(db.pool())
    .await
}

/// Provision the first-use trial row
pub async fn insert_trial(
    db: &ServiceDb,
    user_id: &str,
    trial_ends_at: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO subscriptions (user_id, status, trial_ends_at, created_at, updated_at)
         VALUES ($1, 'trial', $2, $3, $3)",
    )
    .bind(user_id)
    .bind(trial_ends_at)
    .bind(now)
    .execute(db.pool())
    .await?;
    Ok(())
}

/// Set `trial_ends_at` on legacy rows that never had one.
///
/// Only touches rows where it is still NULL, and leaves `updated_at` alone so
/// the newest-row ordering is unchanged.
pub async fn backfill_trial_ends_at(
    db: &ServiceDb,
    user_id: &str,
    trial_ends_at: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE subscriptions SET trial_ends_at = $2
         WHERE user_id = $1 AND trial_ends_at IS NULL",
    )
    .bind(user_id)
    .bind(trial_ends_at)
    .execute(db.pool())
    .await?;
    Ok(result.rows_affected())
}

/// Stripe customer id on the user's newest row that has one
pub async fn find_stripe_customer(
    db: &SessionDb,
    user_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT stripe_customer_id FROM subscriptions
         WHERE user_id = $1 AND stripe_customer_id IS NOT NULL
         ORDER BY updated_at DESC, id DESC
         LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;
    Ok(row.map(|r| r.0))
}

/// Attach a Stripe customer to the user's newest row.
///
/// Inserts a bare `trial` row (no `trial_ends_at`, so the resolver backfills
/// it) when the user has none yet.
pub async fn set_stripe_customer(
    db: &ServiceDb,
    user_id: &str,
    customer_id: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE subscriptions SET stripe_customer_id = $2
         WHERE id = (
            SELECT id FROM subscriptions WHERE user_id = $1
            ORDER BY updated_at DESC, id DESC LIMIT 1
         )",
    )
    .bind(user_id)
    .bind(customer_id)
    .execute(db.pool())
    .await?;

    if updated.rows_affected() == 0 {
        sqlx::query(
            "INSERT INTO subscriptions (user_id, status, stripe_customer_id, created_at, updated_at)
             VALUES ($1, 'trial', $2, $3, $3)",
        )
        .bind(user_id)
        .bind(customer_id)
        .bind(now)
        .execute(db.pool())
        .await?;
    }
    Ok(())
}

pub struct LinkSubscription<'a> {
    pub user_id: &'a str,
    pub status: &'a str,
    pub customer_id: Option<&'a str>,
    pub subscription_id: Option<&'a str>,
    pub current_period_end: Option<i64>,
    pub now: i64,
}

/// Point the user's newest row at a Stripe subscription (or insert one).
///
/// A `None` period end keeps the stored one only while the row already
/// belongs to the same subscription; a different subscription starts
/// open-ended until Stripe reports its period.
pub async fn link_subscription(
    db: &ServiceDb,
    link: &LinkSubscription<'_>,
) -> Result<(), sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE subscriptions SET
            status = $2,
            stripe_customer_id = COALESCE($3, stripe_customer_id),
            stripe_subscription_id = COALESCE($4, stripe_subscription_id),
            current_period_end = COALESCE(
                $5,
                CASE WHEN stripe_subscription_id = $4 THEN current_period_end END
            ),
            updated_at = $6
         WHERE id = (
            SELECT id FROM subscriptions WHERE user_id = $1
            ORDER BY updated_at DESC, id DESC LIMIT 1
         )",
    )
    .bind(link.user_id)
    .bind(link.status)
    .bind(link.customer_id)
    .bind(link.subscription_id)
    .bind(link.current_period_end)
    .bind(link.now)
    .execute(db.pool())
    .await?;

    if updated.rows_affected() == 0 {
        sqlx::query(
            "INSERT INTO subscriptions (user_id, status, current_period_end,
                stripe_customer_id, stripe_subscription_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)",
        )
        .bind(link.user_id)
        .bind(link.status)
        .bind(link.current_period_end)
        .bind(link.customer_id)
        .bind(link.subscription_id)
        .bind(link.now)
        .execute(db.pool())
        .await?;
    }
    Ok(())
}

/// Apply a Stripe-side change to every row linked to a Stripe subscription.
///
/// `None` fields keep their stored value. Returns the number of rows touched.
pub async fn update_by_stripe_subscription(
    db: &ServiceDb,
    stripe_subscription_id: &str,
    status: Option<&str>,
    current_period_end: Option<i64>,
    now: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE subscriptions SET
            status = COALESCE($2, status),
            current_period_end = COALESCE($3, current_period_end),
            updated_at = $4
         WHERE stripe_subscription_id = $1",
    )
    .bind(stripe_subscription_id)
    .bind(status)
    .bind(current_period_end)
    .bind(now)
    .execute(db.pool())
    .await?;
    Ok(result.rows_affected())
}
