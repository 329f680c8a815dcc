//! HTTP handlers for tenant-facing billing endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    CheckAccessQuery, CheckFeatureError, CheckFeatureQuery, StartTrialCommand,
};
use crate::domain::catalog::Feature;
use crate::domain::foundation::ErrorCode;

use super::super::middleware::AuthenticatedTenant;
use super::super::AppState;
use super::dto::{
    CheckoutUrlResponse, EntitlementResponse, ErrorResponse, FeatureCheckResponse,
    SubscriptionResponse,
};

/// GET /api/billing/entitlement - current access decision for the caller.
pub async fn get_entitlement(
    State(state): State<AppState>,
    tenant: AuthenticatedTenant,
) -> Result<impl IntoResponse, BillingApiError> {
    let decision = state
        .check_access_handler()
        .handle(CheckAccessQuery {
            tenant_id: tenant.tenant_id,
        })
        .await
        .map_err(BillingApiError::from)?;

    Ok(Json(EntitlementResponse::from(decision)))
}

/// GET /api/billing/features/:feature - feature gate check.
///
/// A denial is 403 with `FEATURE_NOT_AVAILABLE` and the feature name so the
/// UI can present an upsell instead of a generic failure.
pub async fn check_feature(
    State(state): State<AppState>,
    tenant: AuthenticatedTenant,
    Path(feature_name): Path<String>,
) -> Result<impl IntoResponse, BillingApiError> {
    let Some(feature) = Feature::parse(&feature_name) else {
        return Err(BillingApiError::unknown_feature(&feature_name));
    };

    match state
        .check_feature_handler()
        .handle(CheckFeatureQuery {
            tenant_id: tenant.tenant_id,
            feature,
            role: tenant.role,
        })
        .await
    {
        Ok(()) => Ok(Json(FeatureCheckResponse {
            feature: feature.as_str().to_string(),
            allowed: true,
        })),
        Err(CheckFeatureError::NotAvailable(err)) => Err(BillingApiError::feature_denied(err.feature)),
        Err(CheckFeatureError::Infrastructure(msg)) => Err(BillingApiError::internal(msg)),
    }
}

/// POST /api/billing/trial - open the registration trial for the caller.
pub async fn start_trial(
    State(state): State<AppState>,
    tenant: AuthenticatedTenant,
) -> Result<impl IntoResponse, BillingApiError> {
    let record = state
        .start_trial_handler()
        .handle(StartTrialCommand {
            tenant_id: tenant.tenant_id,
        })
        .await
        .map_err(BillingApiError::from)?;

    Ok((StatusCode::CREATED, Json(SubscriptionResponse::from(record))))
}

/// GET /api/billing/checkout - checkout URL for payment entry points.
pub async fn get_checkout_url(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.effective_settings().await;
    Json(CheckoutUrlResponse {
        checkout_url: settings.checkout_url,
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error with HTTP mapping for billing endpoints.
pub struct BillingApiError {
    status: StatusCode,
    code: String,
    message: String,
}

impl BillingApiError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }

    fn unknown_feature(name: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "UNKNOWN_FEATURE".to_string(),
            message: format!("No feature named '{}'", name),
        }
    }

    fn feature_denied(feature: Feature) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "FEATURE_NOT_AVAILABLE".to_string(),
            message: format!("Feature '{}' is not available on the current plan", feature),
        }
    }
}

impl From<crate::domain::foundation::DomainError> for BillingApiError {
    fn from(err: crate::domain::foundation::DomainError) -> Self {
        let (status, code) = match err.code {
            ErrorCode::TenantNotFound => (StatusCode::NOT_FOUND, "TENANT_NOT_FOUND"),
            ErrorCode::SubscriptionNotFound => (StatusCode::NOT_FOUND, "SUBSCRIPTION_NOT_FOUND"),
            ErrorCode::ValidationFailed => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            ErrorCode::ConcurrentUpdateConflict => (StatusCode::CONFLICT, "CONFLICT"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        Self {
            status,
            code: code.to_string(),
            message: err.message,
        }
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorResponse::new(self.code, self.message);
        (self.status, Json(body)).into_response()
    }
}
