//! Hotmart webhook adapter.
//!
//! Authenticates via the static hottok header, then maps Hotmart's
//! purchase-status taxonomy onto canonical billing events. The HTTP layer
//! acknowledges everything after authentication; this adapter still
//! distinguishes malformed payloads so they can be logged accurately.

use subtle::ConstantTimeEq;

use crate::adapters::AdapterResult;
use crate::domain::billing::{
    BillingEvent, BillingEventKind, PaymentGateway, TenantRef, WebhookError,
};
use crate::domain::foundation::{EmailAddress, Timestamp};

use super::webhook_types::HotmartNotification;

/// Adapter for the Hotmart webhook endpoint.
pub struct HotmartWebhookAdapter {
    token: String,
    /// Only events for this product id are processed, when set.
    product_filter: Option<String>,
}

impl HotmartWebhookAdapter {
    /// Creates an adapter with the configured hottok and optional product
    /// filter.
    pub fn new(token: impl Into<String>, product_filter: Option<String>) -> Self {
        Self {
            token: token.into(),
            product_filter,
        }
    }

    /// Authenticates and normalizes one delivery.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailure` on a missing or mismatched token
    /// - `MalformedPayload` when the body is unparsable or a relevant event
    ///   carries no transaction identifier
    pub fn ingest(
        &self,
        body: &[u8],
        token_header: Option<&str>,
        now: Timestamp,
    ) -> Result<AdapterResult, WebhookError> {
        let presented = token_header.ok_or(WebhookError::AuthenticationFailure)?;
        if presented.as_bytes().ct_eq(self.token.as_bytes()).unwrap_u8() != 1 {
            return Err(WebhookError::AuthenticationFailure);
        }

        let notification: HotmartNotification = serde_json::from_slice(body)
            .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

        if let (Some(filter), Some(product)) =
            (self.product_filter.as_deref(), notification.data.product.as_ref())
        {
            if product.id.to_string() != filter {
                return Ok(AdapterResult::Ignored(format!(
                    "product {} outside configured filter",
                    product.id
                )));
            }
        }

        let kind = match notification.event.as_str() {
            "PURCHASE_COMPLETE" | "PURCHASE_APPROVED" => {
                let recurrence = notification
                    .data
                    .purchase
                    .as_ref()
                    .and_then(|p| p.recurrence_number)
                    .unwrap_or(1);
                if recurrence > 1 {
                    // Renewals arrive as approvals with a recurrence counter.
                    BillingEventKind::InvoicePaid {
                        renewal: notification
                            .data
                            .purchase
                            .as_ref()
                            .and_then(|p| p.date_next_charge)
                            .map(Timestamp::from_unix_millis),
                    }
                } else {
                    BillingEventKind::CheckoutCompleted
                }
            }
            "SUBSCRIPTION_CANCELLATION" | "PURCHASE_CANCELED" => {
                BillingEventKind::SubscriptionCancelled
            }
            "PURCHASE_REFUNDED" | "PURCHASE_CHARGEBACK" => BillingEventKind::PaymentRefunded,
            "PURCHASE_DELAYED" => BillingEventKind::PaymentDelayed,
            "PURCHASE_EXPIRED" => BillingEventKind::SubscriptionExpired,
            other => {
                return Ok(AdapterResult::Ignored(format!(
                    "unhandled hotmart event: {}",
                    other
                )))
            }
        };

        let purchase = notification.data.purchase.as_ref();

        let transaction_id = purchase
            .and_then(|p| p.transaction.clone())
            .or(notification.id.clone())
            .ok_or_else(|| {
                WebhookError::MalformedPayload("missing transaction identifier".to_string())
            })?;

        let occurred_at = purchase
            .and_then(|p| p.approved_date)
            .or(notification.creation_date)
            .map(Timestamp::from_unix_millis)
            .unwrap_or(now);

        let email = match notification.data.buyer.as_ref().and_then(|b| b.email.as_deref()) {
            Some(raw) => EmailAddress::new(raw).ok(),
            None => None,
        };

        let subscription_code = notification
            .data
            .subscription
            .as_ref()
            .and_then(|s| s.subscriber.as_ref())
            .and_then(|s| s.code.clone());

        Ok(AdapterResult::Event(BillingEvent {
            tenant: TenantRef {
                email,
                subscription_code,
            },
            kind,
            plan_hint: purchase
                .and_then(|p| p.offer.as_ref())
                .and_then(|o| o.code.clone()),
            transaction_id,
            occurred_at,
            gateway: PaymentGateway::Hotmart,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TOKEN: &str = "hottok-test-42";

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_100_000)
    }

    fn adapter() -> HotmartWebhookAdapter {
        HotmartWebhookAdapter::new(TOKEN, None)
    }

    fn purchase_payload(event: &str, recurrence: u32) -> serde_json::Value {
        json!({
            "id": "notif-1",
            "event": event,
            "creation_date": 1_700_000_000_000i64,
            "data": {
                "product": { "id": 788221 },
                "buyer": { "email": "Ana@Example.com" },
                "purchase": {
                    "transaction": "HP-TX-1",
                    "status": "APPROVED",
                    "approved_date": 1_700_000_000_000i64,
                    "date_next_charge": 1_702_600_000_000i64,
                    "recurrence_number": recurrence,
                    "offer": { "code": "k9meix5y" }
                },
                "subscription": { "subscriber": { "code": "SUBR-1" } }
            }
        })
    }

    fn ingest(payload: serde_json::Value) -> Result<AdapterResult, WebhookError> {
        let body = serde_json::to_vec(&payload).unwrap();
        adapter().ingest(&body, Some(TOKEN), now())
    }

    // ══════════════════════════════════════════════════════════════
    // Authentication
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn missing_token_is_rejected() {
        let body = serde_json::to_vec(&purchase_payload("PURCHASE_APPROVED", 1)).unwrap();
        let result = adapter().ingest(&body, None, now());
        assert!(matches!(result, Err(WebhookError::AuthenticationFailure)));
    }

    #[test]
    fn wrong_token_is_rejected() {
        let body = serde_json::to_vec(&purchase_payload("PURCHASE_APPROVED", 1)).unwrap();
        let result = adapter().ingest(&body, Some("hottok-wrong"), now());
        assert!(matches!(result, Err(WebhookError::AuthenticationFailure)));
    }

    #[test]
    fn token_comparison_is_exact_match() {
        let body = serde_json::to_vec(&purchase_payload("PURCHASE_APPROVED", 1)).unwrap();
        // Prefix of the real token must not pass.
        let result = adapter().ingest(&body, Some("hottok-test-4"), now());
        assert!(matches!(result, Err(WebhookError::AuthenticationFailure)));
    }

    // ══════════════════════════════════════════════════════════════
    // Event mapping
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn first_approval_maps_to_checkout_completed() {
        let AdapterResult::Event(event) = ingest(purchase_payload("PURCHASE_APPROVED", 1)).unwrap()
        else {
            panic!("expected event");
        };

        assert_eq!(event.kind, BillingEventKind::CheckoutCompleted);
        assert_eq!(event.gateway, PaymentGateway::Hotmart);
        assert_eq!(event.transaction_id, "HP-TX-1");
        assert_eq!(event.plan_hint.as_deref(), Some("k9meix5y"));
        assert_eq!(
            event.tenant.email.as_ref().map(|e| e.as_str()),
            Some("ana@example.com")
        );
        assert_eq!(event.tenant.subscription_code.as_deref(), Some("SUBR-1"));
        assert_eq!(event.occurred_at, Timestamp::from_unix_millis(1_700_000_000_000));
    }

    #[test]
    fn purchase_complete_maps_to_checkout_completed() {
        let AdapterResult::Event(event) = ingest(purchase_payload("PURCHASE_COMPLETE", 1)).unwrap()
        else {
            panic!("expected event");
        };
        assert_eq!(event.kind, BillingEventKind::CheckoutCompleted);
    }

    #[test]
    fn recurring_approval_maps_to_invoice_paid_with_next_charge() {
        let AdapterResult::Event(event) = ingest(purchase_payload("PURCHASE_APPROVED", 3)).unwrap()
        else {
            panic!("expected event");
        };
        assert_eq!(
            event.kind,
            BillingEventKind::InvoicePaid {
                renewal: Some(Timestamp::from_unix_millis(1_702_600_000_000))
            }
        );
    }

    #[test]
    fn cancellation_events_map_to_subscription_cancelled() {
        for name in ["SUBSCRIPTION_CANCELLATION", "PURCHASE_CANCELED"] {
            let AdapterResult::Event(event) = ingest(purchase_payload(name, 1)).unwrap() else {
                panic!("expected event for {}", name);
            };
            assert_eq!(event.kind, BillingEventKind::SubscriptionCancelled, "{}", name);
        }
    }

    #[test]
    fn refund_and_chargeback_map_to_payment_refunded() {
        for name in ["PURCHASE_REFUNDED", "PURCHASE_CHARGEBACK"] {
            let AdapterResult::Event(event) = ingest(purchase_payload(name, 1)).unwrap() else {
                panic!("expected event for {}", name);
            };
            assert_eq!(event.kind, BillingEventKind::PaymentRefunded, "{}", name);
        }
    }

    #[test]
    fn delayed_and_expired_map_to_grace_and_expiry() {
        let AdapterResult::Event(delayed) = ingest(purchase_payload("PURCHASE_DELAYED", 1)).unwrap()
        else {
            panic!("expected event");
        };
        assert_eq!(delayed.kind, BillingEventKind::PaymentDelayed);

        let AdapterResult::Event(expired) = ingest(purchase_payload("PURCHASE_EXPIRED", 1)).unwrap()
        else {
            panic!("expected event");
        };
        assert_eq!(expired.kind, BillingEventKind::SubscriptionExpired);
    }

    #[test]
    fn unknown_events_are_ignored() {
        let result = ingest(purchase_payload("SWITCH_PLAN", 1)).unwrap();
        assert!(matches!(result, AdapterResult::Ignored(_)));
    }

    // ══════════════════════════════════════════════════════════════
    // Product filter and edge cases
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn product_filter_drops_other_products() {
        let adapter = HotmartWebhookAdapter::new(TOKEN, Some("999000".to_string()));
        let body = serde_json::to_vec(&purchase_payload("PURCHASE_APPROVED", 1)).unwrap();

        let result = adapter.ingest(&body, Some(TOKEN), now()).unwrap();
        assert!(matches!(result, AdapterResult::Ignored(_)));
    }

    #[test]
    fn product_filter_passes_matching_product() {
        let adapter = HotmartWebhookAdapter::new(TOKEN, Some("788221".to_string()));
        let body = serde_json::to_vec(&purchase_payload("PURCHASE_APPROVED", 1)).unwrap();

        let result = adapter.ingest(&body, Some(TOKEN), now()).unwrap();
        assert!(matches!(result, AdapterResult::Event(_)));
    }

    #[test]
    fn unparsable_body_is_malformed() {
        let result = adapter().ingest(b"<xml/>", Some(TOKEN), now());
        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }

    #[test]
    fn cancellation_without_purchase_uses_notification_id() {
        let payload = json!({
            "id": "notif-cancel-9",
            "event": "SUBSCRIPTION_CANCELLATION",
            "creation_date": 1_700_050_000_000i64,
            "data": {
                "buyer": { "email": "ana@example.com" },
                "subscription": { "subscriber": { "code": "SUBR-1" } }
            }
        });

        let AdapterResult::Event(event) = ingest(payload).unwrap() else {
            panic!("expected event");
        };
        assert_eq!(event.transaction_id, "notif-cancel-9");
        assert_eq!(event.occurred_at, Timestamp::from_unix_millis(1_700_050_000_000));
    }

    #[test]
    fn event_without_any_transaction_identifier_is_malformed() {
        let payload = json!({
            "event": "PURCHASE_REFUNDED",
            "data": { "buyer": { "email": "ana@example.com" } }
        });

        let result = ingest(payload);
        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }

    #[test]
    fn invalid_buyer_email_does_not_fail_the_event() {
        let payload = json!({
            "id": "notif-2",
            "event": "PURCHASE_APPROVED",
            "creation_date": 1_700_000_000_000i64,
            "data": {
                "buyer": { "email": "not-an-email" },
                "purchase": { "transaction": "HP-TX-2", "recurrence_number": 1 },
                "subscription": { "subscriber": { "code": "SUBR-2" } }
            }
        });

        let AdapterResult::Event(event) = ingest(payload).unwrap() else {
            panic!("expected event");
        };
        // Resolution falls back to the subscriber code.
        assert!(event.tenant.email.is_none());
        assert_eq!(event.tenant.subscription_code.as_deref(), Some("SUBR-2"));
    }
}
