//! StartTrialHandler - Command handler for opening the registration trial.
//!
//! Called by the registration collaborator once per new tenant. The trial
//! length and the plan granted during it come from configuration.

use std::sync::Arc;

use crate::domain::billing::SubscriptionRecord;
use crate::domain::foundation::{DomainError, ErrorCode, PlanSlug, TenantId, Timestamp};
use crate::ports::{SubscriptionStore, TenantDirectory};

/// Command to open a trial for a freshly registered tenant.
#[derive(Debug, Clone)]
pub struct StartTrialCommand {
    pub tenant_id: TenantId,
}

/// Handler for trial creation.
pub struct StartTrialHandler {
    store: Arc<dyn SubscriptionStore>,
    directory: Arc<dyn TenantDirectory>,
    trial_plan: PlanSlug,
    trial_days: i64,
}

impl StartTrialHandler {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        directory: Arc<dyn TenantDirectory>,
        trial_plan: PlanSlug,
        trial_days: i64,
    ) -> Self {
        Self {
            store,
            directory,
            trial_plan,
            trial_days,
        }
    }

    pub async fn handle(&self, cmd: StartTrialCommand) -> Result<SubscriptionRecord, DomainError> {
        if self.directory.find_by_id(&cmd.tenant_id).await?.is_none() {
            return Err(DomainError::new(
                ErrorCode::TenantNotFound,
                format!("No tenant {}", cmd.tenant_id),
            ));
        }

        if self.store.find_by_tenant(&cmd.tenant_id).await?.is_some() {
            return Err(DomainError::validation(
                "tenant_id",
                "Tenant already has a subscription record",
            ));
        }

        let record = SubscriptionRecord::start_trial(
            cmd.tenant_id,
            self.trial_plan.clone(),
            self.trial_days,
            Timestamp::now(),
        );

        self.store.insert(&record).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_mocks::{InMemoryStore, StaticDirectory};
    use crate::domain::billing::SubscriptionStatus;
    use crate::domain::foundation::EmailAddress;
    use crate::ports::TenantAccount;

    fn slug(s: &str) -> PlanSlug {
        PlanSlug::new(s).unwrap()
    }

    fn account(id: TenantId) -> TenantAccount {
        TenantAccount {
            id,
            email: EmailAddress::new("ana@example.com").unwrap(),
        }
    }

    #[tokio::test]
    async fn registration_opens_a_trial() {
        let tenant_id = TenantId::new();
        let store = Arc::new(InMemoryStore::new());
        let handler = StartTrialHandler::new(
            store.clone(),
            Arc::new(StaticDirectory::with(account(tenant_id))),
            slug("essential"),
            14,
        );

        let record = handler.handle(StartTrialCommand { tenant_id }).await.unwrap();

        assert_eq!(record.status, SubscriptionStatus::Trial);
        assert!(record.trial_end.unwrap().is_after(&Timestamp::now()));
        assert_eq!(store.get(&tenant_id).unwrap().status, SubscriptionStatus::Trial);
    }

    #[tokio::test]
    async fn unknown_tenant_is_rejected() {
        let handler = StartTrialHandler::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(StaticDirectory::empty()),
            slug("essential"),
            14,
        );

        let result = handler
            .handle(StartTrialCommand {
                tenant_id: TenantId::new(),
            })
            .await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code, ErrorCode::TenantNotFound);
    }

    #[tokio::test]
    async fn second_trial_for_same_tenant_is_rejected() {
        let tenant_id = TenantId::new();
        let store = Arc::new(InMemoryStore::new());
        let handler = StartTrialHandler::new(
            store,
            Arc::new(StaticDirectory::with(account(tenant_id))),
            slug("essential"),
            14,
        );

        handler.handle(StartTrialCommand { tenant_id }).await.unwrap();
        let second = handler.handle(StartTrialCommand { tenant_id }).await;

        assert!(second.is_err());
    }
}
