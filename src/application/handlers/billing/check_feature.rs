//! CheckFeatureHandler - Query handler for the feature gate.
//!
//! Resolves the tenant's current plan and checks the requested capability.
//! Admins bypass the check entirely.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::catalog::{check_feature, Feature, FeatureNotAvailable, Role};
use crate::domain::foundation::TenantId;
use crate::ports::{PlanCatalog, SubscriptionStore};

/// Query to check a feature for a tenant.
#[derive(Debug, Clone)]
pub struct CheckFeatureQuery {
    pub tenant_id: TenantId,
    pub feature: Feature,
    pub role: Role,
}

/// Errors from the feature gate.
#[derive(Debug, Error)]
pub enum CheckFeatureError {
    /// The plan does not include the feature (or there is no plan).
    #[error(transparent)]
    NotAvailable(#[from] FeatureNotAvailable),

    /// Store or catalog failure.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

/// Handler for feature checks.
pub struct CheckFeatureHandler {
    store: Arc<dyn SubscriptionStore>,
    catalog: Arc<dyn PlanCatalog>,
}

impl CheckFeatureHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>, catalog: Arc<dyn PlanCatalog>) -> Self {
        Self { store, catalog }
    }

    pub async fn handle(&self, query: CheckFeatureQuery) -> Result<(), CheckFeatureError> {
        if query.role == Role::Admin {
            return Ok(());
        }

        let record = self
            .store
            .find_by_tenant(&query.tenant_id)
            .await
            .map_err(|e| CheckFeatureError::Infrastructure(e.to_string()))?;

        let plan_slug = record.and_then(|r| r.plan_slug).ok_or(FeatureNotAvailable {
            feature: query.feature,
        })?;

        let plan = self
            .catalog
            .find_by_slug(&plan_slug)
            .await
            .map_err(|e| CheckFeatureError::Infrastructure(e.to_string()))?
            .ok_or(FeatureNotAvailable {
                feature: query.feature,
            })?;

        check_feature(&plan.features, query.feature, query.role)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::SubscriptionRecord;
    use crate::domain::catalog::{CatalogError, Plan, PlanFeatures, PlanLimits};
    use crate::domain::foundation::{DomainError, PlanSlug, Timestamp};
    use crate::ports::UpdateOutcome;
    use async_trait::async_trait;

    struct MockStore {
        record: Option<SubscriptionRecord>,
    }

    #[async_trait]
    impl SubscriptionStore for MockStore {
        async fn find_by_tenant(
            &self,
            _tenant_id: &TenantId,
        ) -> Result<Option<SubscriptionRecord>, DomainError> {
            Ok(self.record.clone())
        }

        async fn find_by_external_subscription(
            &self,
            _code: &str,
        ) -> Result<Option<SubscriptionRecord>, DomainError> {
            Ok(None)
        }

        async fn insert(&self, _record: &SubscriptionRecord) -> Result<(), DomainError> {
            Ok(())
        }

        async fn update_guarded(
            &self,
            _record: &SubscriptionRecord,
            _expected: Timestamp,
        ) -> Result<UpdateOutcome, DomainError> {
            Ok(UpdateOutcome::Updated)
        }

        async fn plan_in_use(&self, _slug: &PlanSlug) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    struct MockCatalog {
        plan: Option<Plan>,
    }

    #[async_trait]
    impl PlanCatalog for MockCatalog {
        async fn list(&self) -> Result<Vec<Plan>, CatalogError> {
            Ok(self.plan.clone().into_iter().collect())
        }

        async fn find_by_slug(&self, _slug: &PlanSlug) -> Result<Option<Plan>, CatalogError> {
            Ok(self.plan.clone())
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

    fn record_on(plan: &str) -> SubscriptionRecord {
        SubscriptionRecord::start_trial(TenantId::new(), slug(plan), 14, Timestamp::now())
    }

    fn plan_with_export() -> Plan {
        Plan {
            slug: slug("pro"),
            name: "Pro".to_string(),
            price_cents: 4900,
            limits: PlanLimits {
                max_clients: None,
                max_monthly_intake_forms: None,
            },
            features: PlanFeatures {
                data_export: true,
                ..Default::default()
            },
            external_offer_id: None,
            active: true,
        }
    }

    fn handler(record: Option<SubscriptionRecord>, plan: Option<Plan>) -> CheckFeatureHandler {
        CheckFeatureHandler::new(
            Arc::new(MockStore { record }),
            Arc::new(MockCatalog { plan }),
        )
    }

    #[tokio::test]
    async fn enabled_feature_passes() {
        let h = handler(Some(record_on("pro")), Some(plan_with_export()));
        let result = h
            .handle(CheckFeatureQuery {
                tenant_id: TenantId::new(),
                feature: Feature::DataExport,
                role: Role::Tenant,
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn disabled_feature_fails_with_feature_name() {
        let h = handler(Some(record_on("pro")), Some(plan_with_export()));
        let result = h
            .handle(CheckFeatureQuery {
                tenant_id: TenantId::new(),
                feature: Feature::CustomBranding,
                role: Role::Tenant,
            })
            .await;

        let Err(CheckFeatureError::NotAvailable(err)) = result else {
            panic!("expected NotAvailable");
        };
        assert_eq!(err.feature, Feature::CustomBranding);
    }

    #[tokio::test]
    async fn tenant_without_record_is_denied() {
        let h = handler(None, Some(plan_with_export()));
        let result = h
            .handle(CheckFeatureQuery {
                tenant_id: TenantId::new(),
                feature: Feature::DataExport,
                role: Role::Tenant,
            })
            .await;
        assert!(matches!(result, Err(CheckFeatureError::NotAvailable(_))));
    }

    #[tokio::test]
    async fn admin_bypasses_even_without_record() {
        let h = handler(None, None);
        let result = h
            .handle(CheckFeatureQuery {
                tenant_id: TenantId::new(),
                feature: Feature::CustomBranding,
                role: Role::Admin,
            })
            .await;
        assert!(result.is_ok());
    }
}
