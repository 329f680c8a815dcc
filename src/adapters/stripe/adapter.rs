//! Stripe webhook adapter.
//!
//! Authenticates the delivery, then maps Stripe's event taxonomy onto
//! canonical billing events. Unknown or irrelevant event types are
//! acknowledged and dropped, never treated as errors.

use crate::adapters::AdapterResult;
use crate::domain::billing::{
    BillingEvent, BillingEventKind, PaymentGateway, TenantRef, WebhookError,
};
use crate::domain::foundation::{EmailAddress, Timestamp};

use super::webhook_types::{CheckoutSessionObject, InvoiceObject, StripeEvent, SubscriptionObject};
use super::webhook_verifier::StripeWebhookVerifier;

/// Adapter for the Stripe webhook endpoint.
pub struct StripeWebhookAdapter {
    verifier: StripeWebhookVerifier,
}

impl StripeWebhookAdapter {
    /// Creates an adapter with the given signing secret.
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            verifier: StripeWebhookVerifier::new(webhook_secret),
        }
    }

    /// Authenticates and normalizes one delivery.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailure` / `TimestampOutOfRange` before any parsing
    /// - `MalformedPayload` when a relevant event is missing required fields
    ///   (rejected so Stripe retries)
    pub fn ingest(
        &self,
        body: &[u8],
        signature_header: &str,
        now: Timestamp,
    ) -> Result<AdapterResult, WebhookError> {
        self.verifier.verify(body, signature_header, now)?;

        let event: StripeEvent = serde_json::from_slice(body)
            .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

        let occurred_at = Timestamp::from_unix_secs(event.created);

        match event.event_type.as_str() {
            "checkout.session.completed" => {
                let session: CheckoutSessionObject = event
                    .object_as()
                    .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

                let email = match session.buyer_email() {
                    Some(raw) => Some(EmailAddress::new(raw).map_err(|e| {
                        WebhookError::MalformedPayload(e.to_string())
                    })?),
                    None => None,
                };

                Ok(AdapterResult::Event(BillingEvent {
                    tenant: TenantRef {
                        email,
                        subscription_code: session.subscription.clone(),
                    },
                    kind: BillingEventKind::CheckoutCompleted,
                    plan_hint: session.price_id().map(str::to_string),
                    transaction_id: event.id,
                    occurred_at,
                    gateway: PaymentGateway::Stripe,
                }))
            }
            "invoice.paid" => {
                let invoice: InvoiceObject = event
                    .object_as()
                    .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

                let email = match invoice.customer_email.as_deref() {
                    Some(raw) => Some(EmailAddress::new(raw).map_err(|e| {
                        WebhookError::MalformedPayload(e.to_string())
                    })?),
                    None => None,
                };

                Ok(AdapterResult::Event(BillingEvent {
                    tenant: TenantRef {
                        email,
                        subscription_code: invoice.subscription.clone(),
                    },
                    kind: BillingEventKind::InvoicePaid {
                        renewal: invoice.period_end.map(Timestamp::from_unix_secs),
                    },
                    plan_hint: None,
                    transaction_id: event.id,
                    occurred_at,
                    gateway: PaymentGateway::Stripe,
                }))
            }
            "customer.subscription.deleted" => {
                let subscription: SubscriptionObject = event
                    .object_as()
                    .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

                Ok(AdapterResult::Event(BillingEvent {
                    tenant: TenantRef {
                        email: None,
                        subscription_code: Some(subscription.id),
                    },
                    kind: BillingEventKind::SubscriptionCancelled,
                    plan_hint: None,
                    transaction_id: event.id,
                    occurred_at,
                    gateway: PaymentGateway::Stripe,
                }))
            }
            other => Ok(AdapterResult::Ignored(format!(
                "unhandled stripe event type: {}",
                other
            ))),
        }
    }
}
