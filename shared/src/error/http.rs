//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NotAuthenticated | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::SubscriptionRequired => StatusCode::PAYMENT_REQUIRED,
            Self::PaymentSetupFailed => StatusCode::BAD_GATEWAY,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationFailed | Self::StripeCustomerMissing => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_codes_are_unauthorized() {
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::TokenInvalid.http_status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_payment_required_status() {
        assert_eq!(
            ErrorCode::SubscriptionRequired.http_status(),
            StatusCode::PAYMENT_REQUIRED
        );
    }

    #[test]
    fn test_upstream_and_internal_status() {
        assert_eq!(
            ErrorCode::PaymentSetupFailed.http_status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bad_request_status() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::StripeCustomerMissing.http_status(),
            StatusCode::BAD_REQUEST
        );
    }
}
