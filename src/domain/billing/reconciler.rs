//! Entitlement reconciliation.
//!
//! `reconcile` is a pure function from (current record, canonical event) to
//! an outcome; persistence happens afterwards as a single conditional write.
//! Keeping it pure makes retries, idempotency, and ordering behavior
//! directly testable without any I/O.
//!
//! # Guards
//!
//! - **Idempotency**: the record stores the transaction id of the most
//!   recently applied event; a redelivery of the same id is a no-op.
//! - **Ordering**: an event older than the record's `updated_at` is ignored
//!   for period/plan fields. Cancellations and refunds are exempt: they
//!   always apply, biasing toward revocation over continued access.

use crate::domain::foundation::{PlanSlug, Timestamp};

use super::event::{BillingEvent, BillingEventKind};
use super::status::SubscriptionStatus;
use super::subscription::SubscriptionRecord;

/// Length assumed for a billing period when the gateway reports no renewal
/// date.
const ASSUMED_PERIOD_DAYS: i64 = 30;

/// Outcome of reconciling one event against one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The event changed the record; persist the new version.
    Applied(SubscriptionRecord),

    /// The event's transaction id was already applied; nothing to do.
    Duplicate,

    /// The event predates the record's last update and is not a
    /// revocation; nothing to do.
    Stale,
}

/// Applies a canonical event to the current record.
///
/// `resolved_plan` is the plan the application layer resolved from the
/// event's offer hint (or the configured default); it is only consulted for
/// activation events.
pub fn reconcile(
    current: &SubscriptionRecord,
    event: &BillingEvent,
    resolved_plan: Option<PlanSlug>,
    now: Timestamp,
) -> Reconciliation {
    if current.external_transaction_id.as_deref() == Some(event.transaction_id.as_str()) {
        return Reconciliation::Duplicate;
    }

    if event.occurred_at.is_before(&current.updated_at) && !event.kind.is_revocation() {
        return Reconciliation::Stale;
    }

    let mut next = current.clone();

    match &event.kind {
        BillingEventKind::CheckoutCompleted => {
            next.status = SubscriptionStatus::Active;
            if resolved_plan.is_some() {
                next.plan_slug = resolved_plan;
            }
            next.period_start = Some(now);
            next.period_end = Some(now.add_days(ASSUMED_PERIOD_DAYS));
        }
        BillingEventKind::InvoicePaid { renewal } => {
            next.status = SubscriptionStatus::Active;
            next.period_end = Some(renewal.unwrap_or_else(|| now.add_days(ASSUMED_PERIOD_DAYS)));
            if next.period_start.is_none() {
                next.period_start = Some(now);
            }
        }
        BillingEventKind::SubscriptionCancelled => {
            next.status = SubscriptionStatus::Cancelled;
        }
        BillingEventKind::PaymentRefunded => {
            next.status = SubscriptionStatus::Refunded;
        }
        BillingEventKind::PaymentDelayed => {
            next.status = SubscriptionStatus::Overdue;
        }
        BillingEventKind::SubscriptionExpired => {
            next.status = SubscriptionStatus::Expired;
        }
    }

    next.gateway = Some(event.gateway);
    next.external_transaction_id = Some(event.transaction_id.clone());
    if let Some(code) = &event.tenant.subscription_code {
        next.external_subscription_id = Some(code.clone());
    }

    // updated_at must keep advancing even under clock skew: it is both the
    // ordering guard and the optimistic-concurrency token.
    next.updated_at = if now.is_after(&current.updated_at) {
        now
    } else {
        current.updated_at.add_secs(1)
    };

    Reconciliation::Applied(next)
}
