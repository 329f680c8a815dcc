//! Billing settings port.
//!
//! Admin-managed configuration consumed at request time: webhook
//! credentials, the optional Hotmart product filter, and the checkout URL
//! the UI renders for payment entry points. Values unset here fall back to
//! the deployment configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;

/// Admin-configured billing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSettings {
    /// Stripe webhook signing secret.
    pub stripe_webhook_secret: Option<String>,

    /// Hotmart webhook token (hottok).
    pub hotmart_webhook_token: Option<String>,

    /// Only process Hotmart events for this product id; others are
    /// acknowledged and dropped.
    pub hotmart_product_id: Option<String>,

    /// Checkout URL surfaced to the UI collaborator.
    pub checkout_url: Option<String>,
}

/// Port for billing settings persistence.
#[async_trait]
pub trait BillingSettingsStore: Send + Sync {
    /// Load current settings. A store with nothing saved returns defaults.
    async fn get(&self) -> Result<BillingSettings, DomainError>;

    /// Replace current settings.
    async fn put(&self, settings: &BillingSettings) -> Result<(), DomainError>;
}
