//! Adapters - implementations of the ports plus the gateway and HTTP
//! boundaries.

pub mod hotmart;
pub mod http;
pub mod notifier;
pub mod postgres;
pub mod stripe;

use crate::domain::billing::BillingEvent;

/// What a gateway adapter's ingestion produced.
///
/// `Ignored` covers authenticated deliveries with nothing to reconcile:
/// unknown event types, filtered products, events without entitlement
/// consequences. They are acknowledged so the gateway does not retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterResult {
    /// A canonical event ready for reconciliation.
    Event(BillingEvent),

    /// Authenticated delivery with nothing to reconcile.
    Ignored(String),
}
