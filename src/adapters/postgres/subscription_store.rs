//! PostgreSQL implementation of SubscriptionStore.
//!
//! One row per tenant in `subscriptions`. Writes race through an optimistic
//! compare-and-swap on `updated_at`; the row-level atomicity of the UPDATE
//! guarantees readers never observe a half-applied record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{PaymentGateway, SubscriptionRecord, SubscriptionStatus};
use crate::domain::foundation::{DomainError, ErrorCode, PlanSlug, TenantId, Timestamp};
use crate::ports::{SubscriptionStore, UpdateOutcome};

/// PostgreSQL implementation of the SubscriptionStore port.
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription record.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    tenant_id: Uuid,
    plan_slug: Option<String>,
    status: String,
    trial_end: Option<DateTime<Utc>>,
    period_start: Option<DateTime<Utc>>,
    period_end: Option<DateTime<Utc>>,
    gateway: Option<String>,
    external_transaction_id: Option<String>,
    external_subscription_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for SubscriptionRecord {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status = SubscriptionStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid status value: {}", row.status),
            )
        })?;

        let gateway = row
            .gateway
            .as_deref()
            .map(|g| {
                PaymentGateway::parse(g).ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Invalid gateway value: {}", g),
                    )
                })
            })
            .transpose()?;

        let plan_slug = row
            .plan_slug
            .map(PlanSlug::new)
            .transpose()
            .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?;

        Ok(SubscriptionRecord {
            tenant_id: TenantId::from_uuid(row.tenant_id),
            plan_slug,
            status,
            trial_end: row.trial_end.map(Timestamp::from_datetime),
            period_start: row.period_start.map(Timestamp::from_datetime),
            period_end: row.period_end.map(Timestamp::from_datetime),
            gateway,
            external_transaction_id: row.external_transaction_id,
            external_subscription_id: row.external_subscription_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT tenant_id, plan_slug, status, trial_end, period_start, period_end,
           gateway, external_transaction_id, external_subscription_id,
           created_at, updated_at
    FROM subscriptions
"#;

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn find_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let row: Option<SubscriptionRow> =
            sqlx::query_as(&format!("{} WHERE tenant_id = $1", SELECT_COLUMNS))
                .bind(tenant_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to load subscription: {}", e),
                    )
                })?;

        row.map(SubscriptionRecord::try_from).transpose()
    }

    async fn find_by_external_subscription(
        &self,
        subscription_code: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "{} WHERE external_subscription_id = $1",
            SELECT_COLUMNS
        ))
        .bind(subscription_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to load subscription: {}", e),
            )
        })?;

        row.map(SubscriptionRecord::try_from).transpose()
    }

    async fn insert(&self, record: &SubscriptionRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                tenant_id, plan_slug, status, trial_end, period_start, period_end,
                gateway, external_transaction_id, external_subscription_id,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.tenant_id.as_uuid())
        .bind(record.plan_slug.as_ref().map(|p| p.as_str()))
        .bind(record.status.as_str())
        .bind(record.trial_end.map(|t| *t.as_datetime()))
        .bind(record.period_start.map(|t| *t.as_datetime()))
        .bind(record.period_end.map(|t| *t.as_datetime()))
        .bind(record.gateway.map(|g| g.as_str()))
        .bind(&record.external_transaction_id)
        .bind(&record.external_subscription_id)
        .bind(record.created_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("subscriptions_pkey") {
                    return DomainError::new(
                        ErrorCode::ConcurrentUpdateConflict,
                        "Tenant already has a subscription record",
                    );
                }
            }
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert subscription: {}", e),
            )
        })?;

        Ok(())
    }

    async fn update_guarded(
        &self,
        record: &SubscriptionRecord,
        expected_updated_at: Timestamp,
    ) -> Result<UpdateOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                plan_slug = $2,
                status = $3,
                trial_end = $4,
                period_start = $5,
                period_end = $6,
                gateway = $7,
                external_transaction_id = $8,
                external_subscription_id = $9,
                updated_at = $10
            WHERE tenant_id = $1 AND updated_at = $11
            "#,
        )
        .bind(record.tenant_id.as_uuid())
        .bind(record.plan_slug.as_ref().map(|p| p.as_str()))
        .bind(record.status.as_str())
        .bind(record.trial_end.map(|t| *t.as_datetime()))
        .bind(record.period_start.map(|t| *t.as_datetime()))
        .bind(record.period_end.map(|t| *t.as_datetime()))
        .bind(record.gateway.map(|g| g.as_str()))
        .bind(&record.external_transaction_id)
        .bind(&record.external_subscription_id)
        .bind(record.updated_at.as_datetime())
        .bind(expected_updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update subscription: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            Ok(UpdateOutcome::Conflict)
        } else {
            Ok(UpdateOutcome::Updated)
        }
    }

    async fn plan_in_use(&self, slug: &PlanSlug) -> Result<bool, DomainError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE plan_slug = $1")
                .bind(slug.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to count plan references: {}", e),
                    )
                })?;

        Ok(count > 0)
    }
}
