//! Request/response DTOs for tenant-facing billing endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::billing::{AccessDecision, DenialReason, SubscriptionRecord, SubscriptionStatus};
use crate::domain::foundation::Timestamp;

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Entitlement decision as returned to the UI.
#[derive(Debug, Serialize)]
pub struct EntitlementResponse {
    pub granted: bool,
    pub plan_slug: Option<String>,
    pub reason: Option<DenialReason>,
}

impl From<AccessDecision> for EntitlementResponse {
    fn from(decision: AccessDecision) -> Self {
        Self {
            granted: decision.granted,
            plan_slug: decision.plan_slug.map(|p| p.as_str().to_string()),
            reason: decision.reason,
        }
    }
}

/// Feature gate answer.
#[derive(Debug, Serialize)]
pub struct FeatureCheckResponse {
    pub feature: String,
    pub allowed: bool,
}

/// Subscription record view for the owning tenant.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub status: SubscriptionStatus,
    pub plan_slug: Option<String>,
    pub trial_end: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
}

impl From<SubscriptionRecord> for SubscriptionResponse {
    fn from(record: SubscriptionRecord) -> Self {
        Self {
            status: record.status,
            plan_slug: record.plan_slug.map(|p| p.as_str().to_string()),
            trial_end: record.trial_end,
            period_end: record.period_end,
        }
    }
}

/// Checkout entry point for the UI.
#[derive(Debug, Serialize)]
pub struct CheckoutUrlResponse {
    pub checkout_url: Option<String>,
}
