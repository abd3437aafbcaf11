//! Database access layer
//!
//! Two capability-scoped handles over the same schema. `SessionDb` is what a
//! request acting for its own user gets; `ServiceDb` is the elevated handle for
//! writes the user's own permissions do not cover (trial provisioning, billing
//! state from Stripe). Query functions take the handle they need, so elevated
//! access is always visible at the call site.

pub mod checkins;
pub mod subscriptions;
pub mod webhook_events;

use sqlx::PgPool;

/// Session-scoped datastore handle
#[derive(Clone)]
pub struct SessionDb {
    pool: PgPool,
}

impl SessionDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Elevated datastore handle
#[derive(Clone)]
pub struct ServiceDb {
    pool: PgPool,
}

impl ServiceDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}
