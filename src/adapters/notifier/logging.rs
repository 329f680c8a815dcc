//! Tracing-backed notifier.
//!
//! Emits structured log records for every notice. Deployments that deliver
//! confirmation emails or attribution pings plug their own implementation
//! into the same port; this one guarantees the seam never blocks.

use async_trait::async_trait;

use crate::ports::{BillingNotice, BillingNotifier};

/// Notifier that records notices via `tracing`.
pub struct LoggingNotifier;

#[async_trait]
impl BillingNotifier for LoggingNotifier {
    async fn notify(&self, notice: BillingNotice) {
        match notice {
            BillingNotice::EntitlementChanged {
                tenant_id,
                status,
                plan_slug,
                gateway,
            } => {
                tracing::info!(
                    %tenant_id,
                    status = status.as_str(),
                    plan = plan_slug.as_ref().map(|p| p.as_str()).unwrap_or("-"),
                    gateway = gateway.as_str(),
                    "entitlement changed"
                );
            }
            BillingNotice::PlanMappingMissing {
                gateway,
                offer_code,
            } => {
                tracing::warn!(
                    gateway = gateway.as_str(),
                    offer_code = %offer_code,
                    "gateway offer has no plan mapping; default plan applied"
                );
            }
        }
    }
}
