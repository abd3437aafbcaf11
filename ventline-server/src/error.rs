//! Handler error type for ventline-server
//!
//! Infrastructure failures are logged here and reach the client only as a
//! generic code; `AppError`s pass through unchanged.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("database: {0}")]
    Store(#[from] sqlx::Error),
    /// Stripe REST call failed or returned an unexpected body
    #[error("stripe: {0}")]
    Stripe(BoxError),
    #[error(transparent)]
    App(#[from] AppError),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Store(e) => {
                tracing::error!(error = %e, "Database error");
                AppError::new(ErrorCode::InternalError)
            }
            ServiceError::Stripe(e) => {
                tracing::error!(error = %e, "Stripe request failed");
                AppError::new(ErrorCode::PaymentSetupFailed)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn store_errors_hide_details() {
        let app: AppError = ServiceError::from(sqlx::Error::RowNotFound).into();
        assert_eq!(app.code, ErrorCode::InternalError);
        assert_eq!(app.message, "Internal server error");
    }

    #[test]
    fn stripe_errors_become_payment_setup_failures() {
        let err = ServiceError::Stripe("Stripe create_customer failed: {}".into());
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::PaymentSetupFailed);
        assert_eq!(app.message, "Payment setup failed");
    }

    #[test]
    fn app_errors_pass_through() {
        let err = ServiceError::from(AppError::new(ErrorCode::StripeCustomerMissing));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
