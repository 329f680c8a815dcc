//! Shared in-memory port implementations for handler tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::billing::SubscriptionRecord;
use crate::domain::foundation::{DomainError, EmailAddress, ErrorCode, PlanSlug, TenantId, Timestamp};
use crate::ports::{SubscriptionStore, TenantAccount, TenantDirectory, UpdateOutcome};

/// Map-backed subscription store.
pub struct InMemoryStore {
    records: Mutex<HashMap<TenantId, SubscriptionRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_record(record: SubscriptionRecord) -> Self {
        let store = Self::new();
        store
            .records
            .lock()
            .unwrap()
            .insert(record.tenant_id, record);
        store
    }

    pub fn get(&self, tenant_id: &TenantId) -> Option<SubscriptionRecord> {
        self.records.lock().unwrap().get(tenant_id).cloned()
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn find_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        Ok(self.records.lock().unwrap().get(tenant_id).cloned())
    }

    async fn find_by_external_subscription(
        &self,
        subscription_code: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.external_subscription_id.as_deref() == Some(subscription_code))
            .cloned())
    }

    async fn insert(&self, record: &SubscriptionRecord) -> Result<(), DomainError> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.tenant_id) {
            return Err(DomainError::new(
                ErrorCode::ConcurrentUpdateConflict,
                "Tenant already has a subscription record",
            ));
        }
        records.insert(record.tenant_id, record.clone());
        Ok(())
    }

    async fn update_guarded(
        &self,
        record: &SubscriptionRecord,
        expected_updated_at: Timestamp,
    ) -> Result<UpdateOutcome, DomainError> {
        let mut records = self.records.lock().unwrap();
        match records.get(&record.tenant_id) {
            Some(stored) if stored.updated_at == expected_updated_at => {
                records.insert(record.tenant_id, record.clone());
                Ok(UpdateOutcome::Updated)
            }
            _ => Ok(UpdateOutcome::Conflict),
        }
    }

    async fn plan_in_use(&self, slug: &PlanSlug) -> Result<bool, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .any(|r| r.plan_slug.as_ref() == Some(slug)))
    }
}

/// Fixed-content tenant directory.
pub struct StaticDirectory {
    accounts: Vec<TenantAccount>,
}

impl StaticDirectory {
    pub fn with(account: TenantAccount) -> Self {
        Self {
            accounts: vec![account],
        }
    }

    pub fn empty() -> Self {
        Self { accounts: vec![] }
    }
}

#[async_trait]
impl TenantDirectory for StaticDirectory {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<TenantAccount>, DomainError> {
        Ok(self.accounts.iter().find(|a| &a.email == email).cloned())
    }

    async fn find_by_id(&self, id: &TenantId) -> Result<Option<TenantAccount>, DomainError> {
        Ok(self.accounts.iter().find(|a| &a.id == id).cloned())
    }
}
