//! Billing notifier port.
//!
//! Side effects that follow an entitlement decision but are not part of it:
//! confirmation emails, ad-attribution pings, operator alerts. Notices are
//! dispatched on a spawned task after the store write and must never block
//! or fail a webhook acknowledgement.

use async_trait::async_trait;

use crate::domain::billing::{PaymentGateway, SubscriptionStatus};
use crate::domain::foundation::{PlanSlug, TenantId};

/// A notice about an entitlement change or an ingestion anomaly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingNotice {
    /// A gateway event changed a tenant's entitlement.
    EntitlementChanged {
        tenant_id: TenantId,
        status: SubscriptionStatus,
        plan_slug: Option<PlanSlug>,
        gateway: PaymentGateway,
    },

    /// A gateway offer code had no catalog mapping; the default plan was
    /// used.
    PlanMappingMissing {
        gateway: PaymentGateway,
        offer_code: String,
    },
}

/// Port for fire-and-forget billing side effects.
///
/// Implementations must swallow their own failures (logging them); a failed
/// notification never invalidates the entitlement decision it follows.
#[async_trait]
pub trait BillingNotifier: Send + Sync {
    async fn notify(&self, notice: BillingNotice);
}
