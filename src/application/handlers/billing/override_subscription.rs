//! OverrideSubscriptionHandler - Command handler for explicit admin edits.
//!
//! Besides applied gateway events, this is the only writer of subscription
//! records. Used by support to fix plan or status by hand.

use std::sync::Arc;

use crate::domain::billing::{SubscriptionRecord, SubscriptionStatus};
use crate::domain::foundation::{DomainError, ErrorCode, PlanSlug, TenantId, Timestamp};
use crate::ports::{PlanCatalog, SubscriptionStore, TenantDirectory, UpdateOutcome};

/// Command for a manual plan/status edit.
#[derive(Debug, Clone)]
pub struct OverrideSubscriptionCommand {
    pub tenant_id: TenantId,
    /// New plan; `None` keeps the current plan.
    pub plan_slug: Option<PlanSlug>,
    pub status: SubscriptionStatus,
    /// New period end; `None` keeps the current one.
    pub period_end: Option<Timestamp>,
}

/// Handler for admin subscription overrides.
pub struct OverrideSubscriptionHandler {
    store: Arc<dyn SubscriptionStore>,
    directory: Arc<dyn TenantDirectory>,
    catalog: Arc<dyn PlanCatalog>,
}

impl OverrideSubscriptionHandler {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        directory: Arc<dyn TenantDirectory>,
        catalog: Arc<dyn PlanCatalog>,
    ) -> Self {
        Self {
            store,
            directory,
            catalog,
        }
    }

    pub async fn handle(
        &self,
        cmd: OverrideSubscriptionCommand,
    ) -> Result<SubscriptionRecord, DomainError> {
        if self.directory.find_by_id(&cmd.tenant_id).await?.is_none() {
            return Err(DomainError::new(
                ErrorCode::TenantNotFound,
                format!("No tenant {}", cmd.tenant_id),
            ));
        }

        if let Some(plan) = &cmd.plan_slug {
            let exists = self
                .catalog
                .find_by_slug(plan)
                .await
                .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?
                .is_some();
            if !exists {
                return Err(DomainError::new(
                    ErrorCode::PlanNotFound,
                    format!("No plan '{}'", plan),
                ));
            }
        }

        let now = Timestamp::now();

        match self.store.find_by_tenant(&cmd.tenant_id).await? {
            Some(current) => {
                let mut next = current.clone();
                next.admin_override(cmd.plan_slug.clone(), cmd.status, cmd.period_end, now);

                match self.store.update_guarded(&next, current.updated_at).await? {
                    UpdateOutcome::Updated => Ok(next),
                    UpdateOutcome::Conflict => Err(DomainError::new(
                        ErrorCode::ConcurrentUpdateConflict,
                        "Subscription changed while editing; reload and retry",
                    )),
                }
            }
            None => {
                let mut record = SubscriptionRecord::empty(cmd.tenant_id, now);
                record.admin_override(cmd.plan_slug.clone(), cmd.status, cmd.period_end, now);
                self.store.insert(&record).await?;
                Ok(record)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_mocks::{InMemoryStore, StaticDirectory};
    use crate::domain::catalog::{CatalogError, Plan, PlanFeatures, PlanLimits};
    use crate::domain::foundation::EmailAddress;
    use crate::ports::TenantAccount;
    use async_trait::async_trait;

    struct SinglePlanCatalog {
        plan: Plan,
    }

    #[async_trait]
    impl PlanCatalog for SinglePlanCatalog {
        async fn list(&self) -> Result<Vec<Plan>, CatalogError> {
            Ok(vec![self.plan.clone()])
        }

        async fn find_by_slug(&self, slug: &PlanSlug) -> Result<Option<Plan>, CatalogError> {
            Ok((&self.plan.slug == slug).then(|| self.plan.clone()))
        }

        async fn find_by_offer_id(&self, _offer: &str) -> Result<Option<Plan>, CatalogError> {
            Ok(None)
        }

        async fn create(&self, _plan: &Plan) -> Result<(), CatalogError> {
            Ok(())
        }

        async fn update(&self, _plan: &Plan) -> Result<(), CatalogError> {
            Ok(())
        }

        async fn delete(&self, _slug: &PlanSlug) -> Result<(), CatalogError> {
            Ok(())
        }
    }

    fn slug(s: &str) -> PlanSlug {
        PlanSlug::new(s).unwrap()
    }

    fn catalog() -> SinglePlanCatalog {
        SinglePlanCatalog {
            plan: Plan {
                slug: slug("pro"),
                name: "Pro".to_string(),
                price_cents: 4900,
                limits: PlanLimits {
                    max_clients: None,
                    max_monthly_intake_forms: None,
                },
                features: PlanFeatures::default(),
                external_offer_id: None,
                active: true,
            },
        }
    }

    fn account(id: TenantId) -> TenantAccount {
        TenantAccount {
            id,
            email: EmailAddress::new("ana@example.com").unwrap(),
        }
    }

    #[tokio::test]
    async fn override_updates_existing_record() {
        let tenant_id = TenantId::new();
        let record = SubscriptionRecord::start_trial(
            tenant_id,
            slug("essential"),
            14,
            Timestamp::from_unix_secs(1_000_000),
        );
        let store = Arc::new(InMemoryStore::with_record(record));

        let handler = OverrideSubscriptionHandler::new(
            store.clone(),
            Arc::new(StaticDirectory::with(account(tenant_id))),
            Arc::new(catalog()),
        );

        let updated = handler
            .handle(OverrideSubscriptionCommand {
                tenant_id,
                plan_slug: Some(slug("pro")),
                status: SubscriptionStatus::Active,
                period_end: Some(Timestamp::now().add_days(30)),
            })
            .await
            .unwrap();

        assert_eq!(updated.status, SubscriptionStatus::Active);
        assert_eq!(updated.plan_slug, Some(slug("pro")));
        assert_eq!(store.get(&tenant_id).unwrap(), updated);
    }

    #[tokio::test]
    async fn override_creates_record_when_missing() {
        let tenant_id = TenantId::new();
        let store = Arc::new(InMemoryStore::new());

        let handler = OverrideSubscriptionHandler::new(
            store.clone(),
            Arc::new(StaticDirectory::with(account(tenant_id))),
            Arc::new(catalog()),
        );

        handler
            .handle(OverrideSubscriptionCommand {
                tenant_id,
                plan_slug: Some(slug("pro")),
                status: SubscriptionStatus::Active,
                period_end: None,
            })
            .await
            .unwrap();

        assert!(store.get(&tenant_id).is_some());
    }

    #[tokio::test]
    async fn override_with_unknown_plan_is_rejected() {
        let tenant_id = TenantId::new();
        let handler = OverrideSubscriptionHandler::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(StaticDirectory::with(account(tenant_id))),
            Arc::new(catalog()),
        );

        let result = handler
            .handle(OverrideSubscriptionCommand {
                tenant_id,
                plan_slug: Some(slug("imaginary")),
                status: SubscriptionStatus::Active,
                period_end: None,
            })
            .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::PlanNotFound);
    }

    #[tokio::test]
    async fn override_for_unknown_tenant_is_rejected() {
        let handler = OverrideSubscriptionHandler::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(StaticDirectory::empty()),
            Arc::new(catalog()),
        );

        let result = handler
            .handle(OverrideSubscriptionCommand {
                tenant_id: TenantId::new(),
                plan_slug: None,
                status: SubscriptionStatus::None,
                period_end: None,
            })
            .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::TenantNotFound);
    }
}
