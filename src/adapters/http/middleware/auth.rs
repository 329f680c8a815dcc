//! Authenticated tenant extraction.
//!
//! Request authentication belongs to the gateway/auth collaborator; by the
//! time a request reaches this service it carries identity headers. The
//! extractor turns them into a typed context and rejects requests without
//! them, distinctly from any billing denial.

use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::catalog::Role;
use crate::domain::foundation::TenantId;

use super::super::billing::dto::ErrorResponse;

/// Authenticated caller context extracted from request headers.
///
/// `X-Tenant-Id` carries the tenant; `X-Role: admin` marks operator
/// sessions.
#[derive(Debug, Clone)]
pub struct AuthenticatedTenant {
    pub tenant_id: TenantId,
    pub role: Role,
}

impl AuthenticatedTenant {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Rejection type for AuthenticatedTenant extraction.
#[derive(Debug)]
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedTenant
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let tenant_id = parts
                .headers
                .get("X-Tenant-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<TenantId>().ok())
                .ok_or(AuthenticationRequired)?;

            let role = match parts.headers.get("X-Role").and_then(|v| v.to_str().ok()) {
                Some("admin") => Role::Admin,
                _ => Role::Tenant,
            };

            Ok(AuthenticatedTenant { tenant_id, role })
        })
    }
}
