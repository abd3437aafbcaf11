//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category, derived from the code range
///
/// System errors are logged when they cross the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 0xxx
    General,
    /// 1xxx
    Auth,
    /// 3xxx
    Billing,
    /// 9xxx, and anything unassigned
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            3000..4000 => Self::Billing,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Billing);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        // Unassigned ranges fall back to system
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::ValidationFailed.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::TokenInvalid.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::StripeCustomerMissing.category(),
            ErrorCategory::Billing
        );
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
    }
}
