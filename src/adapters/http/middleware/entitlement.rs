//! Request-time access gate middleware.
//!
//! Applied in front of every protected route. Reads the subscription record
//! fresh on each request and fails closed. A denial is HTTP 402 with a
//! machine-readable `SUBSCRIPTION_REQUIRED` code, deliberately distinct
//! from the 401 an unauthenticated request gets, so the UI routes the user
//! to billing rather than to login.

use axum::extract::{Json, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::billing::{AccessDecision, DenialReason};

use super::super::AppState;
use super::auth::{AuthenticatedTenant, AuthenticationRequired};

/// Denial payload returned by the gate.
#[derive(Debug, Serialize)]
pub struct SubscriptionRequiredResponse {
    pub code: &'static str,
    pub reason: DenialReason,
}

/// Middleware enforcing an active entitlement.
///
/// On grant, the [`AccessDecision`] is attached as a request extension so
/// downstream handlers can read the plan without a second store read.
pub async fn require_subscription(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let tenant =
        match <AuthenticatedTenant as axum::extract::FromRequestParts<()>>::from_request_parts(
            &mut parts,
            &(),
        )
        .await
        {
            Ok(tenant) => tenant,
            Err(_) => return AuthenticationRequired.into_response(),
        };
    request = Request::from_parts(parts, body);

    let decision = match state
        .check_access_handler()
        .handle(crate::application::handlers::billing::CheckAccessQuery {
            tenant_id: tenant.tenant_id,
        })
        .await
    {
        Ok(decision) => decision,
        Err(e) => {
            tracing::error!(error = %e, tenant_id = %tenant.tenant_id, "access check failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if !decision.granted {
        let reason = decision.reason.unwrap_or(DenialReason::SubscriptionRequired);
        let body = SubscriptionRequiredResponse {
            code: "SUBSCRIPTION_REQUIRED",
            reason,
        };
        return (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response();
    }

    request.extensions_mut().insert::<AccessDecision>(decision);
    next.run(request).await
}
