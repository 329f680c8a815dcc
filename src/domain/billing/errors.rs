//! Webhook error types.
//!
//! One taxonomy for both gateways; the HTTP mapping differs per gateway
//! contract. Stripe expects a non-2xx on genuine processing failure so it
//! retries; Hotmart is acknowledged unconditionally once authenticated, with
//! failures only logged.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur during webhook ingestion and reconciliation.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature or token verification failed. No state is read or written.
    #[error("Webhook authentication failed")]
    AuthenticationFailure,

    /// Signature timestamp outside the tolerance window.
    #[error("Signature timestamp out of range")]
    TimestampOutOfRange,

    /// Payload could not be parsed or is missing required fields.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Optimistic write lost the race twice; the event was not applied.
    #[error("Concurrent update conflict persisted after retry")]
    ConflictRetryExhausted,

    /// Persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WebhookError {
    /// Returns true if the gateway should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Storage(_) | WebhookError::ConflictRetryExhausted
        )
    }

    /// HTTP status for the Stripe endpoint.
    ///
    /// Status codes drive Stripe's retry behavior:
    /// - 2xx: acknowledged, no retry
    /// - 4xx: rejected, no retry
    /// - 5xx: will retry
    pub fn stripe_status_code(&self) -> StatusCode {
        match self {
            WebhookError::AuthenticationFailure | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::Storage(_) | WebhookError::ConflictRetryExhausted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Storage(err.to_string())
    }
}
