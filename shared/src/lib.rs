//! Shared types for ventline
//!
//! Wire types used by the server and its tests: the unified error system,
//! subscription/access types and check-in payloads.

pub mod checkin;
pub mod error;
pub mod subscription;
pub mod types;
pub mod util;

pub use subscription::{AccessReason, AccessResult, SubscriptionStatus};
