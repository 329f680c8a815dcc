//! Axum router for tenant-facing billing endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::super::AppState;
use super::handlers::{check_feature, get_checkout_url, get_entitlement, start_trial};

/// Create the billing API router.
///
/// # Routes
///
/// - `GET /entitlement` - current access decision
/// - `GET /features/:feature` - feature gate check
/// - `GET /checkout` - checkout URL for the UI
/// - `POST /trial` - open the registration trial
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entitlement", get(get_entitlement))
        .route("/features/:feature", get(check_feature))
        .route("/checkout", get(get_checkout_url))
        .route("/trial", post(start_trial))
}
