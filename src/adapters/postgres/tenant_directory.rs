//! PostgreSQL implementation of TenantDirectory.
//!
//! Read-only queries over the `tenants` table owned by the accounts
//! subsystem. Email matching compares the lowercased column against the
//! already-normalized `EmailAddress`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, EmailAddress, ErrorCode, TenantId};
use crate::ports::{TenantAccount, TenantDirectory};

/// PostgreSQL implementation of the TenantDirectory port.
pub struct PostgresTenantDirectory {
    pool: PgPool,
}

impl PostgresTenantDirectory {
    /// Creates a new directory with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    email: String,
}

impl TryFrom<TenantRow> for TenantAccount {
    type Error = DomainError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        Ok(TenantAccount {
            id: TenantId::from_uuid(row.id),
            email: EmailAddress::new(row.email)
                .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?,
        })
    }
}

#[async_trait]
impl TenantDirectory for PostgresTenantDirectory {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<TenantAccount>, DomainError> {
        let row: Option<TenantRow> =
            sqlx::query_as("SELECT id, email FROM tenants WHERE LOWER(email) = $1")
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to find tenant: {}", e),
                    )
                })?;

        row.map(TenantAccount::try_from).transpose()
    }

    async fn find_by_id(&self, id: &TenantId) -> Result<Option<TenantAccount>, DomainError> {
        let row: Option<TenantRow> =
            sqlx::query_as("SELECT id, email FROM tenants WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to find tenant: {}", e),
                    )
                })?;

        row.map(TenantAccount::try_from).transpose()
    }
}
