//! Stripe webhook payload types.
//!
//! Only the fields this subsystem reads are captured; the rest of Stripe's
//! event schema is ignored.

use serde::Deserialize;

/// Stripe webhook event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g. "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix seconds).
    pub created: i64,

    /// Event-specific data.
    pub data: StripeEventData,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic by event type).
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Deserializes the data object as the given type.
    pub fn object_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

/// Checkout session object carried by `checkout.session.completed`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionObject {
    /// Buyer email as entered at checkout.
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Buyer email on the attached customer details, when present.
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,

    /// Subscription created by the checkout, when the mode is subscription.
    #[serde(default)]
    pub subscription: Option<String>,

    /// Checkout metadata; `price_id` carries the purchased offer.
    #[serde(default)]
    pub metadata: Option<std::collections::HashMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

impl CheckoutSessionObject {
    /// Best-effort buyer email: checkout field first, customer details
    /// second.
    pub fn buyer_email(&self) -> Option<&str> {
        self.customer_email
            .as_deref()
            .or_else(|| self.customer_details.as_ref()?.email.as_deref())
    }

    /// The purchased price/offer id from metadata, when present.
    pub fn price_id(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("price_id").map(String::as_str)
    }
}

/// Invoice object carried by `invoice.paid`.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceObject {
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Subscription the invoice belongs to.
    #[serde(default)]
    pub subscription: Option<String>,

    /// End of the period this invoice covers (Unix seconds); used as the
    /// renewal date.
    #[serde(default)]
    pub period_end: Option<i64>,
}

/// Subscription object carried by `customer.subscription.deleted`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionObject {
    /// Subscription id (sub_xxx).
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_minimal_event() {
        let json = r#"{
            "id": "evt_1234567890",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": { "object": {} },
            "livemode": false
        }"#;

        let event: StripeEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.id, "evt_1234567890");
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.created, 1704067200);
    }

    #[test]
    fn checkout_session_prefers_direct_email() {
        let session: CheckoutSessionObject = serde_json::from_value(json!({
            "customer_email": "direct@example.com",
            "customer_details": { "email": "details@example.com" }
        }))
        .unwrap();

        assert_eq!(session.buyer_email(), Some("direct@example.com"));
    }

    #[test]
    fn checkout_session_falls_back_to_customer_details() {
        let session: CheckoutSessionObject = serde_json::from_value(json!({
            "customer_details": { "email": "details@example.com" }
        }))
        .unwrap();

        assert_eq!(session.buyer_email(), Some("details@example.com"));
    }

    #[test]
    fn checkout_session_reads_price_id_from_metadata() {
        let session: CheckoutSessionObject = serde_json::from_value(json!({
            "metadata": { "price_id": "price_pro_monthly" }
        }))
        .unwrap();

        assert_eq!(session.price_id(), Some("price_pro_monthly"));
    }

    #[test]
    fn checkout_session_tolerates_missing_fields() {
        let session: CheckoutSessionObject = serde_json::from_value(json!({})).unwrap();
        assert!(session.buyer_email().is_none());
        assert!(session.price_id().is_none());
        assert!(session.subscription.is_none());
    }

    #[test]
    fn invoice_object_parses_renewal_fields() {
        let invoice: InvoiceObject = serde_json::from_value(json!({
            "customer_email": "ana@example.com",
            "subscription": "sub_123",
            "period_end": 1706745600
        }))
        .unwrap();

        assert_eq!(invoice.subscription.as_deref(), Some("sub_123"));
        assert_eq!(invoice.period_end, Some(1706745600));
    }

    #[test]
    fn object_as_fails_for_wrong_shape() {
        let event: StripeEvent = serde_json::from_value(json!({
            "id": "evt_x",
            "type": "customer.subscription.deleted",
            "created": 1,
            "data": { "object": { "not_id": true } }
        }))
        .unwrap();

        assert!(event.object_as::<SubscriptionObject>().is_err());
    }
}
