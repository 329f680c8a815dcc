//! Subscription record aggregate.
//!
//! The single authoritative record of a tenant's entitlement. One row per
//! tenant, overwritten in place; there is no event ledger (see DESIGN.md).
//!
//! # Invariants
//!
//! - `updated_at` advances with every applied mutation and doubles as the
//!   out-of-order guard and the optimistic-concurrency token.
//! - `trial_end` is set at creation and only ever moved by an explicit
//!   admin grant, never by a gateway event.
//! - Which boundary governs access depends on `status`: `trial_end` for
//!   Trial, `period_end` for Active.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PlanSlug, TenantId, Timestamp};

use super::event::PaymentGateway;
use super::status::SubscriptionStatus;

/// Per-tenant subscription record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Owning tenant. Unique; a tenant has exactly one record.
    pub tenant_id: TenantId,

    /// Current plan, if any has been assigned.
    pub plan_slug: Option<PlanSlug>,

    /// Lifecycle status.
    pub status: SubscriptionStatus,

    /// End of the registration trial.
    pub trial_end: Option<Timestamp>,

    /// Start of the current paid period.
    pub period_start: Option<Timestamp>,

    /// End of the current paid period.
    pub period_end: Option<Timestamp>,

    /// Gateway that produced the current paid state.
    pub gateway: Option<PaymentGateway>,

    /// Transaction id of the most recently applied gateway event; the
    /// idempotency guard for redelivered webhooks.
    pub external_transaction_id: Option<String>,

    /// Gateway-side subscription/subscriber code, used to resolve later
    /// events that carry no email.
    pub external_subscription_id: Option<String>,

    /// When the record was created.
    pub created_at: Timestamp,

    /// When the record last changed. Monotonically advancing.
    pub updated_at: Timestamp,
}

impl SubscriptionRecord {
    /// Creates the record at tenant registration, opening the trial.
    pub fn start_trial(
        tenant_id: TenantId,
        plan: PlanSlug,
        trial_days: i64,
        now: Timestamp,
    ) -> Self {
        Self {
            tenant_id,
            plan_slug: Some(plan),
            status: SubscriptionStatus::Trial,
            trial_end: Some(now.add_days(trial_days)),
            period_start: None,
            period_end: None,
            gateway: None,
            external_transaction_id: None,
            external_subscription_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// An empty record for a tenant with no entitlement yet.
    ///
    /// Used when a paid event arrives for a tenant that predates the
    /// subscription feature and has no row. `updated_at` starts at the
    /// epoch: nothing has been applied, so the ordering guard must not
    /// discard the first event however long ago it occurred.
    pub fn empty(tenant_id: TenantId, now: Timestamp) -> Self {
        Self {
            tenant_id,
            plan_slug: None,
            status: SubscriptionStatus::None,
            trial_end: None,
            period_start: None,
            period_end: None,
            gateway: None,
            external_transaction_id: None,
            external_subscription_id: None,
            created_at: now,
            updated_at: Timestamp::default(),
        }
    }

    /// Admin courtesy extension of the trial.
    ///
    /// Extends from the later of `now` and the current `trial_end`, so an
    /// expired tenant gets the full grant from the moment of the grant and
    /// an in-trial tenant gets the grant on top of the remaining time.
    /// This is the only path that moves `trial_end`.
    pub fn extend_trial(&mut self, days: i64, now: Timestamp) {
        let base = match self.trial_end {
            Some(end) if end.is_after(&now) => end,
            _ => now,
        };
        self.trial_end = Some(base.add_days(days));
        self.status = SubscriptionStatus::Trial;
        self.updated_at = now;
    }

    /// Explicit admin edit of plan and status.
    pub fn admin_override(
        &mut self,
        plan: Option<PlanSlug>,
        status: SubscriptionStatus,
        period_end: Option<Timestamp>,
        now: Timestamp,
    ) {
        if plan.is_some() {
            self.plan_slug = plan;
        }
        self.status = status;
        if period_end.is_some() {
            self.period_end = period_end;
        }
        self.updated_at = now;
    }
}
