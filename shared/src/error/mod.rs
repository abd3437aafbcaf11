//! Error system for ventline
//!
//! [`AppError`] carries an [`ErrorCode`] (numeric, grouped into an
//! [`ErrorCategory`] by range), a client-safe message and optional details.
//! It renders as an [`ErrorResponse`] with the code's HTTP status.
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Billing / entitlement errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ErrorResponse};
//!
//! let err = AppError::with_message(ErrorCode::ValidationFailed, "moodScore out of range")
//!     .with_detail("field", "moodScore");
//!
//! let body = ErrorResponse::from(&err);
//! assert_eq!(body.code, 2);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, ErrorResponse};
