//! Tenant directory port.
//!
//! Read-only view of tenant accounts, owned by the accounts collaborator.
//! The billing core only needs to resolve inbound events to a tenant and
//! to confirm a tenant exists for admin actions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, EmailAddress, TenantId};

/// Minimal tenant account view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantAccount {
    pub id: TenantId,
    pub email: EmailAddress,
}

/// Port for resolving tenants.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Find a tenant by contact email.
    ///
    /// Matching is case-insensitive: `EmailAddress` normalizes on
    /// construction and implementations compare the normalized form.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<TenantAccount>, DomainError>;

    /// Find a tenant by id.
    async fn find_by_id(&self, id: &TenantId) -> Result<Option<TenantAccount>, DomainError>;
}
