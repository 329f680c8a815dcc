//! HTTP boundary - axum routers, handlers, and middleware.

pub mod admin;
pub mod billing;
pub mod middleware;
pub mod webhooks;

pub use middleware::{require_subscription, AuthenticatedTenant};

use std::sync::Arc;

use axum::Router;

use crate::application::handlers::billing::{
    ApplyBillingEventHandler, CheckAccessHandler, CheckFeatureHandler,
    GrantTrialExtensionHandler, OverrideSubscriptionHandler, StartTrialHandler,
};
use crate::application::handlers::catalog::{
    CreatePlanHandler, DeletePlanHandler, ListPlansHandler, UpdatePlanHandler,
};
use crate::config::BillingConfig;
use crate::domain::foundation::PlanSlug;
use crate::ports::{
    BillingNotifier, BillingSettings, BillingSettingsStore, PlanCatalog, SubscriptionStore,
    TenantDirectory,
};

/// Shared application state; cloned per request, dependencies behind Arc.
#[derive(Clone)]
pub struct AppState {
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub tenants: Arc<dyn TenantDirectory>,
    pub plans: Arc<dyn PlanCatalog>,
    pub settings: Arc<dyn BillingSettingsStore>,
    pub notifier: Arc<dyn BillingNotifier>,
    pub billing: BillingConfig,
}

impl AppState {
    /// The configured plan used for trials and unmapped offers.
    pub fn default_plan(&self) -> PlanSlug {
        PlanSlug::new(self.billing.default_plan_slug.clone())
            .unwrap_or_else(|_| PlanSlug::new("essential").expect("static slug"))
    }

    /// Stored settings merged over deployment config defaults.
    pub async fn effective_settings(&self) -> BillingSettings {
        use secrecy::ExposeSecret;

        let stored = self.settings.get().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to load billing settings; using config defaults");
            BillingSettings::default()
        });

        BillingSettings {
            stripe_webhook_secret: stored.stripe_webhook_secret.or_else(|| {
                self.billing
                    .stripe_webhook_secret
                    .as_ref()
                    .map(|s| s.expose_secret().clone())
            }),
            hotmart_webhook_token: stored.hotmart_webhook_token.or_else(|| {
                self.billing
                    .hotmart_webhook_token
                    .as_ref()
                    .map(|s| s.expose_secret().clone())
            }),
            hotmart_product_id: stored
                .hotmart_product_id
                .or_else(|| self.billing.hotmart_product_id.clone()),
            checkout_url: stored
                .checkout_url
                .or_else(|| self.billing.checkout_url.clone()),
        }
    }

    // Handlers are built on demand from the shared state.

    pub fn apply_event_handler(&self) -> ApplyBillingEventHandler {
        ApplyBillingEventHandler::new(
            self.subscriptions.clone(),
            self.tenants.clone(),
            self.plans.clone(),
            self.notifier.clone(),
            self.default_plan(),
        )
    }

    pub fn check_access_handler(&self) -> CheckAccessHandler {
        CheckAccessHandler::new(self.subscriptions.clone())
    }

    pub fn check_feature_handler(&self) -> CheckFeatureHandler {
        CheckFeatureHandler::new(self.subscriptions.clone(), self.plans.clone())
    }

    pub fn start_trial_handler(&self) -> StartTrialHandler {
        StartTrialHandler::new(
            self.subscriptions.clone(),
            self.tenants.clone(),
            self.default_plan(),
            self.billing.trial_days,
        )
    }

    pub fn grant_trial_extension_handler(&self) -> GrantTrialExtensionHandler {
        GrantTrialExtensionHandler::new(self.subscriptions.clone())
    }

    pub fn override_subscription_handler(&self) -> OverrideSubscriptionHandler {
        OverrideSubscriptionHandler::new(
            self.subscriptions.clone(),
            self.tenants.clone(),
            self.plans.clone(),
        )
    }

    pub fn list_plans_handler(&self) -> ListPlansHandler {
        ListPlansHandler::new(self.plans.clone())
    }

    pub fn create_plan_handler(&self) -> CreatePlanHandler {
        CreatePlanHandler::new(self.plans.clone())
    }

    pub fn update_plan_handler(&self) -> UpdatePlanHandler {
        UpdatePlanHandler::new(self.plans.clone())
    }

    pub fn delete_plan_handler(&self) -> DeletePlanHandler {
        DeletePlanHandler::new(self.plans.clone(), self.subscriptions.clone())
    }
}

/// Assemble the full API router.
///
/// # Routes
///
/// - `/api/webhooks/*` - gateway ingress, authenticated by signature/token
/// - `/api/billing/*` - tenant-facing entitlement endpoints
/// - `/api/admin/*` - plan and settings administration (admin role)
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/webhooks", webhooks::routes())
        .nest("/api/billing", billing::routes())
        .nest("/api/admin", admin::routes())
}
