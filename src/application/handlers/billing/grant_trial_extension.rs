//! GrantTrialExtensionHandler - Command handler for admin courtesy
//! extensions.
//!
//! The only path that moves `trial_end`. Gateway events never touch it.

use std::sync::Arc;

use crate::domain::billing::SubscriptionRecord;
use crate::domain::foundation::{DomainError, ErrorCode, TenantId, Timestamp};
use crate::ports::{SubscriptionStore, UpdateOutcome};

/// Command to extend a tenant's trial.
#[derive(Debug, Clone)]
pub struct GrantTrialExtensionCommand {
    pub tenant_id: TenantId,
    pub days: i64,
}

/// Handler for trial extensions.
pub struct GrantTrialExtensionHandler {
    store: Arc<dyn SubscriptionStore>,
}

impl GrantTrialExtensionHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        cmd: GrantTrialExtensionCommand,
    ) -> Result<SubscriptionRecord, DomainError> {
        if cmd.days < 1 {
            return Err(DomainError::validation(
                "days",
                "Extension must be at least one day",
            ));
        }

        // One reload-and-retry, same policy as webhook writes.
        for _ in 0..2 {
            let Some(current) = self.store.find_by_tenant(&cmd.tenant_id).await? else {
                return Err(DomainError::new(
                    ErrorCode::SubscriptionNotFound,
                    format!("No subscription record for tenant {}", cmd.tenant_id),
                ));
            };

            let mut next = current.clone();
            next.extend_trial(cmd.days, Timestamp::now());

            match self.store.update_guarded(&next, current.updated_at).await? {
                UpdateOutcome::Updated => return Ok(next),
                UpdateOutcome::Conflict => continue,
            }
        }

        Err(DomainError::new(
            ErrorCode::ConcurrentUpdateConflict,
            "Trial extension lost the update race twice",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_mocks::InMemoryStore;
    use crate::domain::billing::SubscriptionStatus;
    use crate::domain::foundation::PlanSlug;

    fn slug(s: &str) -> PlanSlug {
        PlanSlug::new(s).unwrap()
    }

    #[tokio::test]
    async fn extension_of_expired_tenant_grants_from_now() {
        let tenant_id = TenantId::new();
        let mut record = SubscriptionRecord::start_trial(
            tenant_id,
            slug("essential"),
            14,
            Timestamp::from_unix_secs(1_000_000),
        );
        record.status = SubscriptionStatus::Expired;
        let store = Arc::new(InMemoryStore::with_record(record));

        let handler = GrantTrialExtensionHandler::new(store.clone());
        let updated = handler
            .handle(GrantTrialExtensionCommand { tenant_id, days: 7 })
            .await
            .unwrap();

        assert_eq!(updated.status, SubscriptionStatus::Trial);
        let trial_end = updated.trial_end.unwrap();
        // Access for seven days from the grant, give or take test runtime.
        assert!(trial_end.is_after(&Timestamp::now().add_days(6)));
        assert!(Timestamp::now().add_days(8).is_after(&trial_end));
        assert_eq!(store.get(&tenant_id).unwrap(), updated);
    }

    #[tokio::test]
    async fn extension_without_record_is_rejected() {
        let handler = GrantTrialExtensionHandler::new(Arc::new(InMemoryStore::new()));

        let result = handler
            .handle(GrantTrialExtensionCommand {
                tenant_id: TenantId::new(),
                days: 7,
            })
            .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::SubscriptionNotFound);
    }

    #[tokio::test]
    async fn zero_or_negative_days_are_rejected() {
        let handler = GrantTrialExtensionHandler::new(Arc::new(InMemoryStore::new()));

        for days in [0, -3] {
            let result = handler
                .handle(GrantTrialExtensionCommand {
                    tenant_id: TenantId::new(),
                    days,
                })
                .await;
            assert!(result.is_err());
        }
    }
}
