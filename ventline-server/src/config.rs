//! Server configuration, loaded once at startup and injected into `AppState`

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL for session-scoped access (reads and user-owned writes)
    pub database_url: String,
    /// PostgreSQL URL for elevated access (trial provisioning, webhook writes)
    pub service_database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret the auth provider signs session tokens with
    pub jwt_secret: String,
    /// Expected `aud` claim, if the provider sets one
    pub jwt_audience: Option<String>,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Stripe Price ID for the premium plan
    pub stripe_price_id: String,
    /// Public web app URL (checkout / portal return target)
    pub app_base_url: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        Self::secret_from(name, std::env::var(name).ok(), environment)
    }

    fn secret_from(
        name: &str,
        value: Option<String>,
        environment: &str,
    ) -> Result<String, BoxError> {
        let val = match value {
            Some(v) => v,
            None => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;

        Ok(Self {
            service_database_url: std::env::var("SERVICE_DATABASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| database_url.clone()),
            database_url,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: environment.clone(),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_audience: std::env::var("JWT_AUDIENCE").ok().filter(|s| !s.is_empty()),
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_webhook_secret: Self::require_secret("STRIPE_WEBHOOK_SECRET", &environment)?,
            stripe_price_id: std::env::var("STRIPE_PRICE_ID")
                .unwrap_or_else(|_| "price_premium_monthly".into()),
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_gets_placeholder_secret() {
        let val = Config::secret_from("JWT_SECRET", None, "development").unwrap();
        assert_eq!(val, "dev-JWT_SECRET-not-for-production");
    }

    #[test]
    fn production_requires_secret() {
        let err = Config::secret_from("JWT_SECRET", None, "production").unwrap_err();
        assert_eq!(
            err.to_string(),
            "JWT_SECRET must be set in production environment"
        );
    }

    #[test]
    fn production_rejects_empty_secret() {
        assert!(Config::secret_from("STRIPE_SECRET_KEY", Some(String::new()), "staging").is_err());
        assert_eq!(
            Config::secret_from("STRIPE_SECRET_KEY", Some("sk_live".into()), "staging").unwrap(),
            "sk_live"
        );
    }
}
