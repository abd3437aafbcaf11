//! Entitlement resolution: trial / premium access for a user
//!
//! Every gated route calls [`resolve_access`]. It performs at most one read
//! and one conditional write against the subscription store, and never fails:
//! write failures turn into a denial, read failures are treated as "no row".

use async_trait::async_trait;
use shared::subscription::{AccessResult, SubscriptionStatus, TRIAL_MILLIS, premium_active};

use crate::db::subscriptions::{self, SubscriptionRow};
use crate::db::{ServiceDb, SessionDb};
use crate::error::BoxError;

/// Read side of the subscription store (session-scoped)
#[async_trait]
pub trait SubscriptionReader: Send + Sync {
    async fn read_latest_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<SubscriptionRow>, BoxError>;
}

/// Write side of the subscription store (elevated)
#[async_trait]
pub trait SubscriptionWriter: Send + Sync {
    async fn insert_trial_row(&self, user_id: &str, trial_ends_at: i64) -> Result<(), BoxError>;

    async fn backfill_trial_ends_at(
        &self,
        user_id: &str,
        trial_ends_at: i64,
    ) -> Result<(), BoxError>;
}

#[async_trait]
impl SubscriptionReader for SessionDb {
    async fn read_latest_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<SubscriptionRow>, BoxError> {
        Ok(subscriptions::find_latest(self, user_id).await?)
    }
}

#[async_trait]
impl SubscriptionWriter for ServiceDb {
    async fn insert_trial_row(&self, user_id: &str, trial_ends_at: i64) -> Result<(), BoxError> {
        subscriptions::insert_trial(self, user_id, trial_ends_at, shared::util::now_millis())
            .await?;
        Ok(())
    }

    async fn backfill_trial_ends_at(
        &self,
        user_id: &str,
        trial_ends_at: i64,
    ) -> Result<(), BoxError> {
        subscriptions::backfill_trial_ends_at(self, user_id, trial_ends_at).await?;
        Ok(())
    }
}

/// Resolve a user's access at `now` (epoch millis).
pub async fn resolve_access<R, W>(reader: &R, writer: &W, user_id: &str, now: i64) -> AccessResult
where
    R: SubscriptionReader + ?Sized,
    W: SubscriptionWriter + ?Sized,
{
    let row = match reader.read_latest_subscription(user_id).await {
        Ok(row) => row,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Subscription read failed, treating as new user");
            None
        }
    };

    let Some(row) = row else {
        return provision_trial(writer, user_id, now).await;
    };

    if premium_active(&row.status, row.current_period_end, now) {
        return AccessResult::premium(row.trial_ends_at, row.current_period_end, row.status);
    }

    let trial_ends_at = match row.trial_ends_at {
        Some(ends_at) => ends_at,
        None => {
            let ends_at = now + TRIAL_MILLIS;
            if let Err(e) = writer.backfill_trial_ends_at(user_id, ends_at).await {
                tracing::error!(user_id = %user_id, error = %e, "Trial backfill failed, denying access");
                return AccessResult::denied();
            }
            tracing::info!(user_id = %user_id, trial_ends_at = ends_at, "Backfilled trial expiry");
            ends_at
        }
    };

    AccessResult::trial(trial_ends_at, row.status, now)
}

async fn provision_trial<W>(writer: &W, user_id: &str, now: i64) -> AccessResult
where
    W: SubscriptionWriter + ?Sized,
{
    let trial_ends_at = now + TRIAL_MILLIS;
    if let Err(e) = writer.insert_trial_row(user_id, trial_ends_at).await {
        tracing::error!(user_id = %user_id, error = %e, "Trial provisioning failed, denying access");
        return AccessResult::denied();
    }
    tracing::info!(user_id = %user_id, trial_ends_at, "Provisioned trial");
    AccessResult::trial(trial_ends_at, SubscriptionStatus::Trial.as_db(), now)
}
