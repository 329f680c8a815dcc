//! Canonical billing events.
//!
//! The vendor-agnostic representation of an inbound webhook event. Each
//! gateway adapter's only job is mapping its vendor shape onto this type at
//! the boundary; the reconciler never sees vendor payloads. Canonical events
//! are transient and never persisted.

use crate::domain::foundation::{EmailAddress, Timestamp};

/// External payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentGateway {
    Stripe,
    Hotmart,
}

impl PaymentGateway {
    /// Stable string form, used by the persistence adapters.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentGateway::Stripe => "stripe",
            PaymentGateway::Hotmart => "hotmart",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stripe" => Some(PaymentGateway::Stripe),
            "hotmart" => Some(PaymentGateway::Hotmart),
            _ => None,
        }
    }
}

/// How the event refers to the tenant it belongs to.
///
/// Resolution tries the stored gateway subscription code first, then falls
/// back to the buyer email. At least one key should be present; an event
/// with neither can never resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantRef {
    /// Buyer/customer email as reported by the gateway.
    pub email: Option<EmailAddress>,

    /// Gateway-side subscription/subscriber code.
    pub subscription_code: Option<String>,
}

impl TenantRef {
    /// Reference by email only.
    pub fn by_email(email: EmailAddress) -> Self {
        Self {
            email: Some(email),
            subscription_code: None,
        }
    }

    /// True when the event carries no resolvable key at all.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.subscription_code.is_none()
    }
}

/// The transition a canonical event asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingEventKind {
    /// First successful checkout for a plan.
    CheckoutCompleted,

    /// Recurring payment succeeded; `renewal` is the gateway-reported next
    /// renewal date when available.
    InvoicePaid { renewal: Option<Timestamp> },

    /// Subscription cancelled at the gateway.
    SubscriptionCancelled,

    /// Payment refunded (includes chargebacks).
    PaymentRefunded,

    /// Payment delayed; grace state.
    PaymentDelayed,

    /// Subscription ran out at the gateway.
    SubscriptionExpired,
}

impl BillingEventKind {
    /// Revocation events always apply, even when they arrive out of order.
    pub fn is_revocation(&self) -> bool {
        matches!(
            self,
            BillingEventKind::SubscriptionCancelled | BillingEventKind::PaymentRefunded
        )
    }
}

/// Normalized webhook event, ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingEvent {
    /// How to find the tenant this event belongs to.
    pub tenant: TenantRef,

    /// Requested transition.
    pub kind: BillingEventKind,

    /// Gateway offer/product code hinting at the plan, resolved through the
    /// catalog's offer-id mapping before reconciliation.
    pub plan_hint: Option<String>,

    /// Gateway transaction id; the idempotency key.
    pub transaction_id: String,

    /// When the event occurred at the gateway.
    pub occurred_at: Timestamp,

    /// Originating gateway.
    pub gateway: PaymentGateway,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_and_refund_are_revocations() {
        assert!(BillingEventKind::SubscriptionCancelled.is_revocation());
        assert!(BillingEventKind::PaymentRefunded.is_revocation());
    }

    #[test]
    fn paid_and_lifecycle_kinds_are_not_revocations() {
        assert!(!BillingEventKind::CheckoutCompleted.is_revocation());
        assert!(!BillingEventKind::InvoicePaid { renewal: None }.is_revocation());
        assert!(!BillingEventKind::PaymentDelayed.is_revocation());
        assert!(!BillingEventKind::SubscriptionExpired.is_revocation());
    }

    #[test]
    fn tenant_ref_is_empty_without_keys() {
        assert!(TenantRef::default().is_empty());

        let by_email = TenantRef::by_email(EmailAddress::new("a@b.c").unwrap());
        assert!(!by_email.is_empty());

        let by_code = TenantRef {
            email: None,
            subscription_code: Some("SUB-1".to_string()),
        };
        assert!(!by_code.is_empty());
    }

    #[test]
    fn gateway_string_form_roundtrips() {
        for gateway in [PaymentGateway::Stripe, PaymentGateway::Hotmart] {
            assert_eq!(PaymentGateway::parse(gateway.as_str()), Some(gateway));
        }
        assert_eq!(PaymentGateway::parse("paypal"), None);
    }
}
