//! Stripe gateway adapter.
//!
//! Signature verification over the raw body, then normalization of the
//! checkout/invoice/subscription-deletion taxonomy into canonical events.

mod adapter;
mod webhook_types;
mod webhook_verifier;

pub use adapter::StripeWebhookAdapter;
pub use webhook_types::{CheckoutSessionObject, InvoiceObject, StripeEvent, SubscriptionObject};
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub use webhook_verifier::sign_test_payload;
