//! PostgreSQL implementation of BillingSettingsStore.
//!
//! A single-row settings table; `put` upserts the row.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{BillingSettings, BillingSettingsStore};

/// PostgreSQL implementation of the BillingSettingsStore port.
pub struct PostgresBillingSettingsStore {
    pool: PgPool,
}

impl PostgresBillingSettingsStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    stripe_webhook_secret: Option<String>,
    hotmart_webhook_token: Option<String>,
    hotmart_product_id: Option<String>,
    checkout_url: Option<String>,
}

impl From<SettingsRow> for BillingSettings {
    fn from(row: SettingsRow) -> Self {
        BillingSettings {
            stripe_webhook_secret: row.stripe_webhook_secret,
            hotmart_webhook_token: row.hotmart_webhook_token,
            hotmart_product_id: row.hotmart_product_id,
            checkout_url: row.checkout_url,
        }
    }
}

#[async_trait]
impl BillingSettingsStore for PostgresBillingSettingsStore {
    async fn get(&self) -> Result<BillingSettings, DomainError> {
        let row: Option<SettingsRow> = sqlx::query_as(
            r#"
            SELECT stripe_webhook_secret, hotmart_webhook_token,
                   hotmart_product_id, checkout_url
            FROM billing_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to load billing settings: {}", e),
            )
        })?;

        Ok(row.map(BillingSettings::from).unwrap_or_default())
    }

    async fn put(&self, settings: &BillingSettings) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO billing_settings (
                id, stripe_webhook_secret, hotmart_webhook_token,
                hotmart_product_id, checkout_url
            ) VALUES (1, $1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                stripe_webhook_secret = EXCLUDED.stripe_webhook_secret,
                hotmart_webhook_token = EXCLUDED.hotmart_webhook_token,
                hotmart_product_id = EXCLUDED.hotmart_product_id,
                checkout_url = EXCLUDED.checkout_url
            "#,
        )
        .bind(&settings.stripe_webhook_secret)
        .bind(&settings.hotmart_webhook_token)
        .bind(&settings.hotmart_product_id)
        .bind(&settings.checkout_url)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save billing settings: {}", e),
            )
        })?;

        Ok(())
    }
}
