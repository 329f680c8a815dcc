//! CheckAccessHandler - Query handler for the request-time access gate.
//!
//! Runs on every protected request. Always reads the store fresh; the
//! answer is a pure function of the stored record and the wall clock, so
//! two calls with identical stored state cannot diverge.

use std::sync::Arc;

use crate::domain::billing::{evaluate_access, AccessDecision};
use crate::domain::foundation::{DomainError, TenantId, Timestamp};
use crate::ports::SubscriptionStore;

/// Query to check whether a tenant has access right now.
#[derive(Debug, Clone)]
pub struct CheckAccessQuery {
    pub tenant_id: TenantId,
}

/// Handler for the access gate.
pub struct CheckAccessHandler {
    store: Arc<dyn SubscriptionStore>,
}

impl CheckAccessHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: CheckAccessQuery) -> Result<AccessDecision, DomainError> {
        let record = self.store.find_by_tenant(&query.tenant_id).await?;
        Ok(evaluate_access(record.as_ref(), Timestamp::now()))
    }
}
