//! Subscription store port (the Entitlement Store).
//!
//! The single shared mutable resource of the subsystem. Writes to one
//! tenant's record are serialized with an optimistic conditional update
//! keyed on `updated_at`; reads are lock-free and always hit the store
//! fresh.
//!
//! # Design
//!
//! - One row per tenant, overwritten in place; no event history
//! - Only the reconciler and explicit admin actions write here
//! - `update_guarded` is the compare-and-swap; callers reload and retry
//!   once on `Conflict`

use async_trait::async_trait;

use crate::domain::billing::SubscriptionRecord;
use crate::domain::foundation::{DomainError, PlanSlug, TenantId, Timestamp};

/// Result of a guarded (compare-and-swap) update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record matched the expected version and was replaced.
    Updated,

    /// Another writer got there first; reload and retry.
    Conflict,
}

/// Port for durable per-tenant subscription records.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Load the record for a tenant.
    ///
    /// Returns `None` if the tenant has no record.
    async fn find_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;

    /// Load the record holding a gateway subscription code.
    ///
    /// Used for tenant resolution when the event carries no email.
    async fn find_by_external_subscription(
        &self,
        subscription_code: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;

    /// Insert a brand-new record.
    ///
    /// # Errors
    ///
    /// Fails if the tenant already has a record (unique tenant_id).
    async fn insert(&self, record: &SubscriptionRecord) -> Result<(), DomainError>;

    /// Replace the record only if its stored `updated_at` still equals
    /// `expected_updated_at`.
    async fn update_guarded(
        &self,
        record: &SubscriptionRecord,
        expected_updated_at: Timestamp,
    ) -> Result<UpdateOutcome, DomainError>;

    /// True while any subscription record references the plan.
    ///
    /// Consulted before a plan deletion.
    async fn plan_in_use(&self, slug: &PlanSlug) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn subscription_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SubscriptionStore) {}
    }
}
