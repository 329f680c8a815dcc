//! Billing configuration
//!
//! Bootstrap values for the billing subsystem. Webhook credentials may be
//! superseded at runtime by admin-managed settings (see the
//! `BillingSettingsStore` port); the values here act as the deployment-time
//! defaults.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Billing configuration (Stripe + Hotmart)
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Stripe webhook signing secret (whsec_...)
    pub stripe_webhook_secret: Option<SecretString>,

    /// Hotmart webhook token (hottok), matched against X-Hotmart-Hottok
    pub hotmart_webhook_token: Option<SecretString>,

    /// Optional Hotmart product id filter; events for other products are
    /// acknowledged and dropped
    pub hotmart_product_id: Option<String>,

    /// Checkout URL surfaced to the UI for payment entry points
    pub checkout_url: Option<String>,

    /// Plan assigned when a gateway offer code has no catalog mapping,
    /// and the plan granted during the registration trial
    #[serde(default = "default_plan_slug")]
    pub default_plan_slug: String,

    /// Free trial length granted at tenant registration
    #[serde(default = "default_trial_days")]
    pub trial_days: i64,
}

impl BillingConfig {
    /// Validate billing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(secret) = &self.stripe_webhook_secret {
            if !secret.expose_secret().starts_with("whsec_") {
                return Err(ValidationError::InvalidStripeWebhookSecret);
            }
        }
        if self.trial_days < 1 || self.trial_days > 90 {
            return Err(ValidationError::InvalidTrialDays);
        }
        if self.default_plan_slug.is_empty() {
            return Err(ValidationError::InvalidDefaultPlan);
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            stripe_webhook_secret: None,
            hotmart_webhook_token: None,
            hotmart_product_id: None,
            checkout_url: None,
            default_plan_slug: default_plan_slug(),
            trial_days: default_trial_days(),
        }
    }
}

fn default_plan_slug() -> String {
    "essential".to_string()
}

// Matches the advertised free-trial duration. The registration flow and the
// marketing copy previously disagreed; both now read this single value.
fn default_trial_days() -> i64 {
    14
}
