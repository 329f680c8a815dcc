//! Axum router for the admin surface.

use axum::routing::{get, post, put};
use axum::Router;

use super::super::AppState;
use super::handlers::{
    create_plan, delete_plan, get_billing_settings, grant_trial_extension, list_plans,
    override_subscription, put_billing_settings, update_plan,
};

/// Create the admin API router.
///
/// # Routes (admin role required)
///
/// - `GET /plans` / `POST /plans` - list and create plans
/// - `PUT /plans/:slug` / `DELETE /plans/:slug` - edit and remove plans
/// - `GET|PUT /billing-settings` - webhook credentials, product filter,
///   checkout URL
/// - `POST /tenants/:id/trial-extension` - courtesy trial extension
/// - `PUT /tenants/:id/subscription` - manual plan/status edit
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans).post(create_plan))
        .route("/plans/:slug", put(update_plan).delete(delete_plan))
        .route(
            "/billing-settings",
            get(get_billing_settings).put(put_billing_settings),
        )
        .route("/tenants/:id/trial-extension", post(grant_trial_extension))
        .route("/tenants/:id/subscription", put(override_subscription))
}
