//! Error codes for ventline
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Billing / entitlement errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code enum
///
/// Represented as u16 on the wire so the web client can switch on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Body or query failed to parse or validate
    ValidationFailed = 2,

    // ==================== 1xxx: Auth ====================
    /// No bearer token on the request
    NotAuthenticated = 1001,
    /// Token failed verification or has expired
    TokenInvalid = 1004,

    // ==================== 3xxx: Billing ====================
    /// Trial over and no premium subscription
    SubscriptionRequired = 3001,
    /// Stripe call failed
    PaymentSetupFailed = 3002,
    /// No Stripe customer on file yet
    StripeCustomerMissing = 3003,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::SubscriptionRequired => "Upgrade required",
            ErrorCode::PaymentSetupFailed => "Payment setup failed",
            ErrorCode::StripeCustomerMissing => "No billing account yet",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A u16 that names no [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(ErrorCode::ValidationFailed),
            1001 => Ok(ErrorCode::NotAuthenticated),
            1004 => Ok(ErrorCode::TokenInvalid),
            3001 => Ok(ErrorCode::SubscriptionRequired),
            3002 => Ok(ErrorCode::PaymentSetupFailed),
            3003 => Ok(ErrorCode::StripeCustomerMissing),
            9001 => Ok(ErrorCode::InternalError),
            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
