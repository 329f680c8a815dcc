//! Axum router for webhook ingress.
//!
//! Webhooks carry their own gateway credentials; they bypass the tenant
//! auth extractor entirely.

use axum::routing::post;
use axum::Router;

use super::super::AppState;
use super::handlers::{hotmart_webhook, stripe_webhook};

/// Create the webhook router.
///
/// # Routes
/// - `POST /stripe` - signed Stripe events
/// - `POST /hotmart` - token-authenticated Hotmart events
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stripe", post(stripe_webhook))
        .route("/hotmart", post(hotmart_webhook))
}
