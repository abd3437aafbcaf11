//! Application state for ventline-server

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::db::{ServiceDb, SessionDb};
use crate::error::BoxError;

/// Stripe credentials and plan configuration
#[derive(Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    /// Price ID of the premium plan
    pub price_id: String,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Session-scoped datastore (reads and the user's own writes)
    pub session_db: SessionDb,
    /// Elevated datastore (trial provisioning, billing writes)
    pub service_db: ServiceDb,
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    /// Expected `aud` claim
    pub jwt_audience: Option<String>,
    pub stripe: StripeConfig,
    /// Checkout / portal return target
    pub app_base_url: String,
}

impl AppState {
    /// Create a new AppState: connect both pools and apply migrations
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let session_pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;
        let service_pool = if config.service_database_url == config.database_url {
            session_pool.clone()
        } else {
            PgPoolOptions::new()
                .max_connections(5)
                .connect(&config.service_database_url)
                .await?
        };

        sqlx::migrate!("./migrations").run(&service_pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::from_pools(session_pool, service_pool, config))
    }

    fn from_pools(session_pool: PgPool, service_pool: PgPool, config: &Config) -> Self {
        Self {
            session_db: SessionDb::new(session_pool),
            service_db: ServiceDb::new(service_pool),
            jwt_secret: config.jwt_secret.clone(),
            jwt_audience: config.jwt_audience.clone(),
            stripe: StripeConfig {
                secret_key: config.stripe_secret_key.clone(),
                webhook_secret: config.stripe_webhook_secret.clone(),
                price_id: config.stripe_price_id.clone(),
            },
            app_base_url: config.app_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// State over a lazily connected pool; nothing touches the database
    /// until a query runs.
    #[cfg(test)]
    pub fn lazy_for_tests(config: &Config) -> Self {
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        Self::from_pools(pool.clone(), pool, config)
    }
}
