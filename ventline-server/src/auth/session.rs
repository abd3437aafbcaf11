//! Session JWT authentication for the user-facing API
//!
//! Tokens are issued by the managed auth provider and signed with HS256 using
//! the shared `JWT_SECRET`. This service only verifies them.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use crate::state::AppState;

/// JWT claims carried by a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: String,
    /// User email, when the provider includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiration (Unix timestamp seconds)
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Authenticated user identity extracted from the session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub email: Option<String>,
}

/// Sign a session token the way the auth provider does
#[cfg(test)]
pub fn create_token(
    user_id: &str,
    email: Option<&str>,
    audience: Option<&str>,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (chrono::Utc::now() + chrono::Duration::seconds(ttl_secs)).timestamp();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        email: email.map(str::to_string),
        exp: exp.max(0) as u64,
        aud: audience.map(str::to_string),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a bearer token and return the identity it carries
pub fn verify_token(
    token: &str,
    secret: &str,
    audience: Option<&str>,
) -> Result<SessionIdentity, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    match audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }

    let token_data = jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        AppError::invalid_token("Invalid or expired token")
    })?;

    if token_data.claims.sub.is_empty() {
        return Err(AppError::invalid_token("Token has no subject"));
    }

    Ok(SessionIdentity {
        user_id: token_data.claims.sub,
        email: token_data.claims.email,
    })
}

/// Middleware that verifies the session JWT from the Authorization header
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(AppError::not_authenticated)?;

    let identity = verify_token(token, &state.jwt_secret, state.jwt_audience.as_deref())?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
