//! PostgreSQL implementation of PlanCatalog.
//!
//! Plans live in a `plans` table keyed by slug; limits and features are
//! stored as JSONB so adding a capability does not need a migration.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::catalog::{CatalogError, Plan, PlanFeatures, PlanLimits};
use crate::domain::foundation::PlanSlug;
use crate::ports::PlanCatalog;

/// PostgreSQL implementation of the PlanCatalog port.
pub struct PostgresPlanCatalog {
    pool: PgPool,
}

impl PostgresPlanCatalog {
    /// Creates a new catalog with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    slug: String,
    name: String,
    price_cents: i64,
    limits: serde_json::Value,
    features: serde_json::Value,
    external_offer_id: Option<String>,
    active: bool,
}

impl TryFrom<PlanRow> for Plan {
    type Error = CatalogError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let slug = PlanSlug::new(row.slug)
            .map_err(|e| CatalogError::Storage(format!("Invalid slug in row: {}", e)))?;
        let limits: PlanLimits = serde_json::from_value(row.limits)
            .map_err(|e| CatalogError::Storage(format!("Invalid limits in row: {}", e)))?;
        let features: PlanFeatures = serde_json::from_value(row.features)
            .map_err(|e| CatalogError::Storage(format!("Invalid features in row: {}", e)))?;

        Ok(Plan {
            slug,
            name: row.name,
            price_cents: row.price_cents,
            limits,
            features,
            external_offer_id: row.external_offer_id,
            active: row.active,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT slug, name, price_cents, limits, features, external_offer_id, active FROM plans";

fn storage_err(context: &str, e: sqlx::Error) -> CatalogError {
    CatalogError::Storage(format!("{}: {}", context, e))
}

#[async_trait]
impl PlanCatalog for PostgresPlanCatalog {
    async fn list(&self) -> Result<Vec<Plan>, CatalogError> {
        let rows: Vec<PlanRow> = sqlx::query_as(&format!("{} ORDER BY price_cents", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_err("Failed to list plans", e))?;

        rows.into_iter().map(Plan::try_from).collect()
    }

    async fn find_by_slug(&self, slug: &PlanSlug) -> Result<Option<Plan>, CatalogError> {
        let row: Option<PlanRow> = sqlx::query_as(&format!("{} WHERE slug = $1", SELECT_COLUMNS))
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_err("Failed to find plan", e))?;

        row.map(Plan::try_from).transpose()
    }

    async fn find_by_offer_id(&self, offer_id: &str) -> Result<Option<Plan>, CatalogError> {
        let row: Option<PlanRow> =
            sqlx::query_as(&format!("{} WHERE external_offer_id = $1", SELECT_COLUMNS))
                .bind(offer_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage_err("Failed to find plan by offer", e))?;

        row.map(Plan::try_from).transpose()
    }

    async fn create(&self, plan: &Plan) -> Result<(), CatalogError> {
        let limits = serde_json::to_value(plan.limits)
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        let features = serde_json::to_value(plan.features)
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO plans (slug, name, price_cents, limits, features, external_offer_id, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(plan.slug.as_str())
        .bind(&plan.name)
        .bind(plan.price_cents)
        .bind(limits)
        .bind(features)
        .bind(&plan.external_offer_id)
        .bind(plan.active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("plans_pkey") {
                    return CatalogError::DuplicateSlug(plan.slug.clone());
                }
            }
            storage_err("Failed to create plan", e)
        })?;

        Ok(())
    }

    async fn update(&self, plan: &Plan) -> Result<(), CatalogError> {
        let limits = serde_json::to_value(plan.limits)
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        let features = serde_json::to_value(plan.features)
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE plans SET
                name = $2,
                price_cents = $3,
                limits = $4,
                features = $5,
                external_offer_id = $6,
                active = $7
            WHERE slug = $1
            "#,
        )
        .bind(plan.slug.as_str())
        .bind(&plan.name)
        .bind(plan.price_cents)
        .bind(limits)
        .bind(features)
        .bind(&plan.external_offer_id)
        .bind(plan.active)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_err("Failed to update plan", e))?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::PlanNotFound(plan.slug.clone()));
        }

        Ok(())
    }

    async fn delete(&self, slug: &PlanSlug) -> Result<(), CatalogError> {
        let result = sqlx::query("DELETE FROM plans WHERE slug = $1")
            .bind(slug.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    // Subscriptions reference plans; the FK closes the
                    // check-then-act race on concurrent subscriptions.
                    if db_err.constraint() == Some("subscriptions_plan_slug_fkey") {
                        return CatalogError::PlanInUse(slug.clone());
                    }
                }
                storage_err("Failed to delete plan", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::PlanNotFound(slug.clone()));
        }

        Ok(())
    }
}
