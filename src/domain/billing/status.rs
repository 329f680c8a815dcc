//! Subscription status.
//!
//! One status per tenant subscription record. Unlike a strict state machine,
//! gateway events may arrive in any order, so the reconciler decides which
//! transitions apply; the status itself only answers classification
//! questions.

use serde::{Deserialize, Serialize};

/// Current position of a subscription in the billing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Record exists but carries no entitlement (e.g. created by an admin
    /// override, or revoked without a terminal classification).
    None,

    /// Registration trial; access until `trial_end`.
    Trial,

    /// Paid subscription; access until `period_end`.
    Active,

    /// Payment delayed by the gateway. Access is denied while overdue.
    Overdue,

    /// Subscription cancelled. Access revoked immediately.
    Cancelled,

    /// Subscription ran out without renewal.
    Expired,

    /// Payment refunded. Access revoked immediately regardless of the
    /// remaining paid period.
    Refunded,
}

impl SubscriptionStatus {
    /// True for the statuses that can grant access (subject to the
    /// matching time boundary, checked by the access evaluation).
    pub fn may_grant_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Trial | SubscriptionStatus::Active)
    }

    /// True for statuses produced by revocation events.
    pub fn is_revoked(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Cancelled | SubscriptionStatus::Refunded
        )
    }

    /// Stable string form, used by the persistence adapters.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::None => "none",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Overdue => "overdue",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Refunded => "refunded",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(SubscriptionStatus::None),
            "trial" => Some(SubscriptionStatus::Trial),
            "active" => Some(SubscriptionStatus::Active),
            "overdue" => Some(SubscriptionStatus::Overdue),
            "cancelled" => Some(SubscriptionStatus::Cancelled),
            "expired" => Some(SubscriptionStatus::Expired),
            "refunded" => Some(SubscriptionStatus::Refunded),
            _ => None,
        }
    }
}
