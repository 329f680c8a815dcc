//! Request-time access evaluation.
//!
//! `evaluate_access` is a pure function of the stored record and the wall
//! clock. There is no background expiry sweep: a trial or paid period simply
//! stops granting access once `now` passes its boundary.

use serde::Serialize;

use crate::domain::foundation::{PlanSlug, Timestamp};

use super::status::SubscriptionStatus;
use super::subscription::SubscriptionRecord;

/// Why access was denied.
///
/// Every variant maps to the `SUBSCRIPTION_REQUIRED` family of codes,
/// deliberately distinct from authentication failures so the caller routes
/// the user to billing, not to login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No subscription record, or a record with no entitlement.
    SubscriptionRequired,

    /// The registration trial has run out.
    TrialExpired,

    /// The paid period has run out while status is still Active.
    PeriodLapsed,

    /// Payment is delayed at the gateway.
    PaymentOverdue,

    /// The subscription was cancelled.
    SubscriptionCancelled,

    /// The payment was refunded.
    SubscriptionRefunded,

    /// The subscription expired without renewal.
    SubscriptionExpired,
}

/// Resolved entitlement for a tenant at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    /// Whether access is granted right now.
    pub granted: bool,

    /// Plan in effect (also present on a denial, for upsell context).
    pub plan_slug: Option<PlanSlug>,

    /// Present exactly when `granted` is false.
    pub reason: Option<DenialReason>,
}

impl AccessDecision {
    fn granted(plan_slug: Option<PlanSlug>) -> Self {
        Self {
            granted: true,
            plan_slug,
            reason: None,
        }
    }

    fn denied(plan_slug: Option<PlanSlug>, reason: DenialReason) -> Self {
        Self {
            granted: false,
            plan_slug,
            reason: Some(reason),
        }
    }
}

/// Evaluates access for a record, or the absence of one.
///
/// Missing record fails closed.
pub fn evaluate_access(record: Option<&SubscriptionRecord>, now: Timestamp) -> AccessDecision {
    let Some(record) = record else {
        return AccessDecision::denied(None, DenialReason::SubscriptionRequired);
    };

    let plan = record.plan_slug.clone();

    match record.status {
        SubscriptionStatus::Trial => match record.trial_end {
            Some(end) if now.is_before(&end) => AccessDecision::granted(plan),
            _ => AccessDecision::denied(plan, DenialReason::TrialExpired),
        },
        SubscriptionStatus::Active => match record.period_end {
            Some(end) if now.is_before(&end) => AccessDecision::granted(plan),
            _ => AccessDecision::denied(plan, DenialReason::PeriodLapsed),
        },
        SubscriptionStatus::Overdue => AccessDecision::denied(plan, DenialReason::PaymentOverdue),
        SubscriptionStatus::Cancelled => {
            AccessDecision::denied(plan, DenialReason::SubscriptionCancelled)
        }
        SubscriptionStatus::Refunded => {
            AccessDecision::denied(plan, DenialReason::SubscriptionRefunded)
        }
        SubscriptionStatus::Expired => {
            AccessDecision::denied(plan, DenialReason::SubscriptionExpired)
        }
        SubscriptionStatus::None => {
            AccessDecision::denied(plan, DenialReason::SubscriptionRequired)
        }
    }
}
