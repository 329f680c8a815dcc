//! HTTP middleware.

mod auth;
mod entitlement;

pub use auth::{AuthenticatedTenant, AuthenticationRequired};
pub use entitlement::{require_subscription, SubscriptionRequiredResponse};
