//! Webhook ingress handlers.
//!
//! Response contracts differ per gateway:
//! - Stripe gets a non-2xx on genuine processing failure so it retries;
//!   signature failures are 401 and malformed payloads 400.
//! - Hotmart is acknowledged with 200 unconditionally once the token
//!   checks out; failures are logged, never surfaced, to avoid retry
//!   storms from a less robust sender.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::adapters::hotmart::HotmartWebhookAdapter;
use crate::adapters::stripe::StripeWebhookAdapter;
use crate::adapters::AdapterResult;
use crate::domain::billing::WebhookError;
use crate::domain::foundation::Timestamp;

use super::super::AppState;

/// POST /api/webhooks/stripe
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let settings = state.effective_settings().await;
    let Some(secret) = settings.stripe_webhook_secret else {
        tracing::error!("stripe webhook received but no signing secret is configured");
        return StatusCode::INTERNAL_SERVER_ERROR;
    };

    let Some(signature) = headers.get("Stripe-Signature").and_then(|v| v.to_str().ok())
    else {
        return StatusCode::UNAUTHORIZED;
    };

    let adapter = StripeWebhookAdapter::new(secret);
    let event = match adapter.ingest(&body, signature, Timestamp::now()) {
        Ok(AdapterResult::Event(event)) => event,
        Ok(AdapterResult::Ignored(reason)) => {
            tracing::debug!(reason = %reason, "stripe webhook ignored");
            return StatusCode::OK;
        }
        Err(e) => {
            tracing::warn!(error = %e, "stripe webhook rejected");
            return e.stripe_status_code();
        }
    };

    match state.apply_event_handler().handle(event).await {
        Ok(outcome) => {
            tracing::debug!(?outcome, "stripe webhook processed");
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(error = %e, "stripe webhook processing failed");
            e.stripe_status_code()
        }
    }
}

/// POST /api/webhooks/hotmart
pub async fn hotmart_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let settings = state.effective_settings().await;
    let Some(token) = settings.hotmart_webhook_token else {
        tracing::error!("hotmart webhook received but no token is configured");
        return StatusCode::UNAUTHORIZED;
    };

    let presented = headers
        .get("X-Hotmart-Hottok")
        .and_then(|v| v.to_str().ok());

    let adapter = HotmartWebhookAdapter::new(token, settings.hotmart_product_id);
    let event = match adapter.ingest(&body, presented, Timestamp::now()) {
        Ok(AdapterResult::Event(event)) => event,
        Ok(AdapterResult::Ignored(reason)) => {
            tracing::debug!(reason = %reason, "hotmart webhook ignored");
            return StatusCode::OK;
        }
        Err(WebhookError::AuthenticationFailure) => {
            tracing::warn!("hotmart webhook with bad or missing token");
            return StatusCode::UNAUTHORIZED;
        }
        // Acknowledged once authenticated; logged, never retried.
        Err(e) => {
            tracing::warn!(error = %e, "hotmart webhook dropped");
            return StatusCode::OK;
        }
    };

    match state.apply_event_handler().handle(event).await {
        Ok(outcome) => {
            tracing::debug!(?outcome, "hotmart webhook processed");
        }
        Err(e) => {
            tracing::error!(error = %e, "hotmart webhook processing failed");
        }
    }

    StatusCode::OK
}
