//! `AppError` and the JSON body it renders as

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error crossing the HTTP boundary: a code, a client-safe message and
/// optional structured details (invalid fields, the access payload on 402).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
        fields.sort_unstable();
        AppError::validation(format!("Invalid fields: {}", fields.join(", ")))
            .with_detail("fields", fields)
    }
}

/// Error response body: `{ code, message, details? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        let body = ErrorResponse::from(&self);
        (self.http_status(), axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use validator::Validate;

    #[test]
    fn test_app_error_new_uses_default_message() {
        let err = AppError::new(ErrorCode::StripeCustomerMissing);
        assert_eq!(err.code, ErrorCode::StripeCustomerMissing);
        assert_eq!(err.message, "No billing account yet");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("Missing required fields")
            .with_detail("field", "emotion")
            .with_detail("reason", "required");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "emotion");
        assert_eq!(details.get("reason").unwrap(), "required");
    }

    #[test]
    fn test_auth_constructors() {
        assert_eq!(
            AppError::not_authenticated().http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::invalid_token("bad signature").code,
            ErrorCode::TokenInvalid
        );
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(range(min = 1, max = 5))]
        score: i16,
        #[validate(length(min = 1))]
        label: String,
    }

    #[test]
    fn test_from_validation_errors_lists_fields() {
        let sample = Sample {
            score: 9,
            label: String::new(),
        };
        let err: AppError = sample.validate().unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Invalid fields: label, score");
        assert_eq!(
            err.details.unwrap().get("fields").unwrap(),
            &serde_json::json!(["label", "score"])
        );
    }

    #[test]
    fn test_error_response_body() {
        let err = AppError::new(ErrorCode::SubscriptionRequired)
            .with_detail("access", serde_json::json!({ "hasAccess": false }));
        let body = ErrorResponse::from(&err);

        assert_eq!(body.code, 3001);
        assert_eq!(body.message, "Upgrade required");
        assert!(body.details.unwrap().contains_key("access"));

        let plain = serde_json::to_value(ErrorResponse::from(&AppError::not_authenticated())).unwrap();
        assert!(plain.get("details").is_none());
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::new(ErrorCode::SubscriptionRequired).into_response();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    }
}
