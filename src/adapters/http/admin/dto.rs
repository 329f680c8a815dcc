//! Request/response DTOs for the admin surface.

use serde::{Deserialize, Serialize};

use crate::domain::billing::SubscriptionStatus;
use crate::domain::catalog::{Plan, PlanFeatures, PlanLimits};
use crate::domain::foundation::Timestamp;

/// Plan as returned to the admin UI.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub slug: String,
    pub name: String,
    pub price_cents: i64,
    pub limits: PlanLimits,
    pub features: PlanFeatures,
    pub external_offer_id: Option<String>,
    pub active: bool,
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        Self {
            slug: plan.slug.as_str().to_string(),
            name: plan.name,
            price_cents: plan.price_cents,
            limits: plan.limits,
            features: plan.features,
            external_offer_id: plan.external_offer_id,
            active: plan.active,
        }
    }
}

/// Body for POST /admin/plans.
#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub slug: String,
    pub name: String,
    pub price_cents: i64,
    #[serde(default = "unlimited")]
    pub limits: PlanLimits,
    #[serde(default)]
    pub features: PlanFeatures,
    #[serde(default)]
    pub external_offer_id: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Body for PUT /admin/plans/:slug. The slug comes from the path and
/// cannot be changed.
#[derive(Debug, Deserialize)]
pub struct UpdatePlanRequest {
    pub name: String,
    pub price_cents: i64,
    #[serde(default = "unlimited")]
    pub limits: PlanLimits,
    #[serde(default)]
    pub features: PlanFeatures,
    #[serde(default)]
    pub external_offer_id: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn unlimited() -> PlanLimits {
    PlanLimits {
        max_clients: None,
        max_monthly_intake_forms: None,
    }
}

fn default_active() -> bool {
    true
}

/// Body for POST /admin/tenants/:id/trial-extension.
#[derive(Debug, Deserialize)]
pub struct TrialExtensionRequest {
    pub days: i64,
}

/// Body for PUT /admin/tenants/:id/subscription.
#[derive(Debug, Deserialize)]
pub struct OverrideSubscriptionRequest {
    #[serde(default)]
    pub plan_slug: Option<String>,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub period_end: Option<Timestamp>,
}
