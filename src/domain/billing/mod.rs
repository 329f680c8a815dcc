//! Billing domain module.
//!
//! The entitlement lifecycle: canonical gateway events, the per-tenant
//! subscription record, the pure reconciler that applies events to records,
//! and the pure access evaluation read on every protected request.
//!
//! # Module Structure
//!
//! - `event` - Canonical BillingEvent and tenant resolution keys
//! - `subscription` - SubscriptionRecord aggregate
//! - `status` - SubscriptionStatus
//! - `reconciler` - Pure reconcile() with idempotency and ordering guards
//! - `access` - Pure evaluate_access() and denial reasons
//! - `errors` - WebhookError taxonomy

mod access;
mod errors;
mod event;
mod reconciler;
mod status;
mod subscription;

pub use access::{evaluate_access, AccessDecision, DenialReason};
pub use errors::WebhookError;
pub use event::{BillingEvent, BillingEventKind, PaymentGateway, TenantRef};
pub use reconciler::{reconcile, Reconciliation};
pub use status::SubscriptionStatus;
pub use subscription::SubscriptionRecord;

#[cfg(test)]
pub use event::test_support::BillingEventBuilder;
