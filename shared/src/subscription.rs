//! Subscription status tokens and the derived access result
//!
//! Status tokens come from two writers (the trial provisioner and the Stripe
//! webhook), so parsing is case-insensitive and unknown tokens are tolerated.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Fixed trial length, applied both on first provisioning and on backfill
pub const TRIAL_DAYS: i64 = 3;

/// Trial length in milliseconds
pub const TRIAL_MILLIS: i64 = TRIAL_DAYS * 24 * 60 * 60 * 1000;

/// Recognized subscription status tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Free trial provisioned on first use
    Trial,
    /// Paid and current
    Active,
    /// Provider-side trial of a paid plan
    Trialing,
    /// Payment failed, provider retrying
    PastDue,
    /// Canceled (accepts both "canceled" and "cancelled")
    Canceled,
    /// Ran out without renewal
    Expired,
    /// Never activated or deactivated
    Inactive,
}

impl SubscriptionStatus {
    /// Parse a stored status token (case-insensitive, exact token)
    pub fn from_db(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trial" => Some(Self::Trial),
            "active" => Some(Self::Active),
            "trialing" => Some(Self::Trialing),
            "past_due" => Some(Self::PastDue),
            "canceled" | "cancelled" => Some(Self::Canceled),
            "expired" => Some(Self::Expired),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
            Self::Inactive => "inactive",
        }
    }

    /// Statuses that never grant premium, whatever the period end says
    pub fn is_canceled_like(&self) -> bool {
        matches!(self, Self::Canceled | Self::Expired | Self::Inactive)
    }

    /// Statuses that grant premium while the paid period is open
    pub fn is_premium_eligible(&self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }
}

/// Whether a stored row currently grants premium access.
///
/// A missing `current_period_end` counts as open-ended: some providers omit
/// it for active subscriptions.
pub fn premium_active(status: &str, current_period_end: Option<Timestamp>, now: Timestamp) -> bool {
    let Some(status) = SubscriptionStatus::from_db(status) else {
        return false;
    };
    if status.is_canceled_like() || !status.is_premium_eligible() {
        return false;
    }
    current_period_end.is_none_or(|end| end > now)
}

/// Why access was granted or denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    TrialActive,
    PremiumActive,
    TrialExpired,
}

/// Derived entitlement for one user at one instant (never persisted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResult {
    pub has_access: bool,
    pub reason: AccessReason,
    pub trial_ends_at: Option<Timestamp>,
    pub premium_until: Option<Timestamp>,
    pub status: Option<String>,
}

impl AccessResult {
    /// Fail-closed result used whenever provisioning cannot complete
    pub fn denied() -> Self {
        Self {
            has_access: false,
            reason: AccessReason::TrialExpired,
            trial_ends_at: None,
            premium_until: None,
            status: None,
        }
    }

    /// Premium result; the row's trial expiry, if any, is carried through
    pub fn premium(
        trial_ends_at: Option<Timestamp>,
        premium_until: Option<Timestamp>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            has_access: true,
            reason: AccessReason::PremiumActive,
            trial_ends_at,
            premium_until,
            status: Some(status.into()),
        }
    }

    /// Trial evaluation: access iff the trial ends strictly after `now`
    pub fn trial(trial_ends_at: Timestamp, status: impl Into<String>, now: Timestamp) -> Self {
        let active = trial_ends_at > now;
        Self {
            has_access: active,
            reason: if active {
                AccessReason::TrialActive
            } else {
                AccessReason::TrialExpired
            },
            trial_ends_at: Some(trial_ends_at),
            premium_until: None,
            status: Some(status.into()),
        }
    }
}
