//! ApplyBillingEventHandler - Command handler for canonical gateway events.
//!
//! The orchestration around the pure reconciler: resolve the tenant,
//! resolve the plan hint, reconcile, then persist with a single optimistic
//! conditional write (one reload-and-retry on conflict). Side effects are
//! dispatched on a spawned task after the write and never delay the
//! gateway acknowledgement.

use std::sync::Arc;

use crate::domain::billing::{
    reconcile, BillingEvent, BillingEventKind, Reconciliation, SubscriptionRecord,
    SubscriptionStatus, WebhookError,
};
use crate::domain::foundation::{PlanSlug, TenantId, Timestamp};
use crate::ports::{
    BillingNotice, BillingNotifier, PlanCatalog, SubscriptionStore, TenantDirectory,
    UpdateOutcome,
};

/// Result of applying one canonical event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The event changed the tenant's record.
    Applied {
        tenant_id: TenantId,
        status: SubscriptionStatus,
        plan_slug: Option<PlanSlug>,
    },

    /// The transaction id was already applied; acknowledged, no change.
    DuplicateEvent,

    /// The event predates the record; acknowledged, no change.
    StaleEvent,

    /// No tenant matched the event's keys; acknowledged, warned, no change.
    UnresolvedTenant,
}

/// Handler for reconciling canonical gateway events into the store.
pub struct ApplyBillingEventHandler {
    store: Arc<dyn SubscriptionStore>,
    directory: Arc<dyn TenantDirectory>,
    catalog: Arc<dyn PlanCatalog>,
    notifier: Arc<dyn BillingNotifier>,
    default_plan: PlanSlug,
}

impl ApplyBillingEventHandler {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        directory: Arc<dyn TenantDirectory>,
        catalog: Arc<dyn PlanCatalog>,
        notifier: Arc<dyn BillingNotifier>,
        default_plan: PlanSlug,
    ) -> Self {
        Self {
            store,
            directory,
            catalog,
            notifier,
            default_plan,
        }
    }

    pub async fn handle(&self, event: BillingEvent) -> Result<ApplyOutcome, WebhookError> {
        let now = Timestamp::now();

        // 1. Resolve the tenant: stored subscription code first, then email.
        let (tenant_id, current) = match self.resolve_tenant(&event).await? {
            Some(resolved) => resolved,
            None => {
                tracing::warn!(
                    gateway = event.gateway.as_str(),
                    transaction_id = %event.transaction_id,
                    email = event.tenant.email.as_ref().map(|e| e.as_str()).unwrap_or("-"),
                    "webhook event did not resolve to a tenant; acknowledged without processing"
                );
                return Ok(ApplyOutcome::UnresolvedTenant);
            }
        };

        // 2. Resolve the plan hint for activation events.
        let resolved_plan = self.resolve_plan(&event).await?;

        // 3. Reconcile against the current record (or an empty one for a
        //    tenant that predates subscriptions).
        let is_new = current.is_none();
        let base = current.unwrap_or_else(|| SubscriptionRecord::empty(tenant_id, now));

        let next = match reconcile(&base, &event, resolved_plan, now) {
            Reconciliation::Duplicate => return Ok(ApplyOutcome::DuplicateEvent),
            Reconciliation::Stale => return Ok(ApplyOutcome::StaleEvent),
            Reconciliation::Applied(next) => next,
        };

        // 4. Persist with one reload-and-retry on a lost race.
        let persisted = if is_new {
            match self.store.insert(&next).await {
                Ok(()) => next,
                // A concurrent writer created the row between our read and
                // our insert; fall through to the guarded-update path.
                Err(_) => self.retry_against_fresh_record(&event, now).await?,
            }
        } else {
            match self.store.update_guarded(&next, base.updated_at).await? {
                UpdateOutcome::Updated => next,
                UpdateOutcome::Conflict => self.retry_against_fresh_record(&event, now).await?,
            }
        };

        // 5. Side effects after the write; never awaited by the caller.
        let notifier = self.notifier.clone();
        let notice = BillingNotice::EntitlementChanged {
            tenant_id,
            status: persisted.status,
            plan_slug: persisted.plan_slug.clone(),
            gateway: event.gateway,
        };
        tokio::spawn(async move {
            notifier.notify(notice).await;
        });

        Ok(ApplyOutcome::Applied {
            tenant_id,
            status: persisted.status,
            plan_slug: persisted.plan_slug,
        })
    }

    async fn resolve_tenant(
        &self,
        event: &BillingEvent,
    ) -> Result<Option<(TenantId, Option<SubscriptionRecord>)>, WebhookError> {
        if let Some(code) = &event.tenant.subscription_code {
            if let Some(record) = self.store.find_by_external_subscription(code).await? {
                return Ok(Some((record.tenant_id, Some(record))));
            }
        }

        if let Some(email) = &event.tenant.email {
            if let Some(account) = self.directory.find_by_email(email).await? {
                let record = self.store.find_by_tenant(&account.id).await?;
                return Ok(Some((account.id, record)));
            }
        }

        Ok(None)
    }

    async fn resolve_plan(&self, event: &BillingEvent) -> Result<Option<PlanSlug>, WebhookError> {
        // Only activation events assign a plan.
        if !matches!(event.kind, BillingEventKind::CheckoutCompleted) {
            return Ok(None);
        }

        if let Some(hint) = &event.plan_hint {
            match self
                .catalog
                .find_by_offer_id(hint)
                .await
                .map_err(|e| WebhookError::Storage(e.to_string()))?
            {
                Some(plan) => return Ok(Some(plan.slug)),
                None => {
                    tracing::warn!(
                        gateway = event.gateway.as_str(),
                        offer_code = %hint,
                        default_plan = self.default_plan.as_str(),
                        "offer code has no plan mapping; using default plan"
                    );
                    let notifier = self.notifier.clone();
                    let notice = BillingNotice::PlanMappingMissing {
                        gateway: event.gateway,
                        offer_code: hint.clone(),
                    };
                    tokio::spawn(async move {
                        notifier.notify(notice).await;
                    });
                }
            }
        }

        Ok(Some(self.default_plan.clone()))
    }

    /// Reload the record and apply the event once more. A second conflict
    /// means sustained contention; the gateway will redeliver.
    async fn retry_against_fresh_record(
        &self,
        event: &BillingEvent,
        now: Timestamp,
    ) -> Result<SubscriptionRecord, WebhookError> {
        let Some((_, current)) = self.resolve_tenant(event).await? else {
            return Err(WebhookError::ConflictRetryExhausted);
        };
        let Some(current) = current else {
            return Err(WebhookError::ConflictRetryExhausted);
        };

        let resolved_plan = self.resolve_plan(event).await?;

        match reconcile(&current, event, resolved_plan, now) {
            // The racing write already applied this transaction.
            Reconciliation::Duplicate | Reconciliation::Stale => Ok(current),
            Reconciliation::Applied(next) => {
                match self.store.update_guarded(&next, current.updated_at).await? {
                    UpdateOutcome::Updated => Ok(next),
                    UpdateOutcome::Conflict => {
                        tracing::error!(
                            tenant_id = %current.tenant_id,
                            transaction_id = %event.transaction_id,
                            "subscription write lost the race twice; giving up"
                        );
                        Err(WebhookError::ConflictRetryExhausted)
                    }
                }
            }
        }
    }
}
