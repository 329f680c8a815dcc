//! HTTP handlers for the admin surface.
//!
//! Every endpoint requires the admin role; a non-admin caller gets 403
//! before any handler logic runs.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    GrantTrialExtensionCommand, OverrideSubscriptionCommand,
};
use crate::application::handlers::catalog::{
    CreatePlanCommand, DeletePlanCommand, UpdatePlanCommand,
};
use crate::domain::catalog::{CatalogError, Plan};
use crate::domain::foundation::{ErrorCode, PlanSlug, TenantId};
use crate::ports::BillingSettings;

use super::super::billing::dto::{ErrorResponse, SubscriptionResponse};
use super::super::middleware::AuthenticatedTenant;
use super::super::AppState;
use super::dto::{
    CreatePlanRequest, OverrideSubscriptionRequest, PlanResponse, TrialExtensionRequest,
    UpdatePlanRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Plan Administration
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/plans
pub async fn list_plans(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
) -> Result<impl IntoResponse, AdminApiError> {
    require_admin(&caller)?;

    let plans = state.list_plans_handler().handle().await?;
    let response: Vec<PlanResponse> = plans.into_iter().map(PlanResponse::from).collect();
    Ok(Json(response))
}

/// POST /api/admin/plans
pub async fn create_plan(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
    Json(request): Json<CreatePlanRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    require_admin(&caller)?;

    let slug = PlanSlug::new(request.slug)
        .map_err(|e| AdminApiError::bad_request("INVALID_SLUG", e.to_string()))?;

    let plan = Plan {
        slug,
        name: request.name,
        price_cents: request.price_cents,
        limits: request.limits,
        features: request.features,
        external_offer_id: request.external_offer_id,
        active: request.active,
    };

    let created = state
        .create_plan_handler()
        .handle(CreatePlanCommand { plan })
        .await?;

    Ok((StatusCode::CREATED, Json(PlanResponse::from(created))))
}

/// PUT /api/admin/plans/:slug
pub async fn update_plan(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
    Path(slug): Path<String>,
    Json(request): Json<UpdatePlanRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    require_admin(&caller)?;

    let slug = PlanSlug::new(slug)
        .map_err(|e| AdminApiError::bad_request("INVALID_SLUG", e.to_string()))?;

    let updated = state
        .update_plan_handler()
        .handle(UpdatePlanCommand {
            slug,
            name: request.name,
            price_cents: request.price_cents,
            limits: request.limits,
            features: request.features,
            external_offer_id: request.external_offer_id,
            active: request.active,
        })
        .await?;

    Ok(Json(PlanResponse::from(updated)))
}

/// DELETE /api/admin/plans/:slug
pub async fn delete_plan(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AdminApiError> {
    require_admin(&caller)?;

    let slug = PlanSlug::new(slug)
        .map_err(|e| AdminApiError::bad_request("INVALID_SLUG", e.to_string()))?;

    state
        .delete_plan_handler()
        .handle(DeletePlanCommand { slug })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Billing Settings
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/billing-settings
pub async fn get_billing_settings(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
) -> Result<impl IntoResponse, AdminApiError> {
    require_admin(&caller)?;

    let settings = state
        .settings
        .get()
        .await
        .map_err(AdminApiError::from)?;
    Ok(Json(settings))
}

/// PUT /api/admin/billing-settings
pub async fn put_billing_settings(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
    Json(settings): Json<BillingSettings>,
) -> Result<impl IntoResponse, AdminApiError> {
    require_admin(&caller)?;

    state
        .settings
        .put(&settings)
        .await
        .map_err(AdminApiError::from)?;
    Ok(Json(settings))
}

// ════════════════════════════════════════════════════════════════════════════════
// Tenant Subscription Administration
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/admin/tenants/:id/trial-extension
pub async fn grant_trial_extension(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
    Path(tenant_id): Path<TenantId>,
    Json(request): Json<TrialExtensionRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    require_admin(&caller)?;

    let record = state
        .grant_trial_extension_handler()
        .handle(GrantTrialExtensionCommand {
            tenant_id,
            days: request.days,
        })
        .await?;

    Ok(Json(SubscriptionResponse::from(record)))
}

/// PUT /api/admin/tenants/:id/subscription
pub async fn override_subscription(
    State(state): State<AppState>,
    caller: AuthenticatedTenant,
    Path(tenant_id): Path<TenantId>,
    Json(request): Json<OverrideSubscriptionRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    require_admin(&caller)?;

    let plan_slug = request
        .plan_slug
        .map(PlanSlug::new)
        .transpose()
        .map_err(|e| AdminApiError::bad_request("INVALID_SLUG", e.to_string()))?;

    let record = state
        .override_subscription_handler()
        .handle(OverrideSubscriptionCommand {
            tenant_id,
            plan_slug,
            status: request.status,
            period_end: request.period_end,
        })
        .await?;

    Ok(Json(SubscriptionResponse::from(record)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

fn require_admin(caller: &AuthenticatedTenant) -> Result<(), AdminApiError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(AdminApiError {
            status: StatusCode::FORBIDDEN,
            code: "FORBIDDEN".to_string(),
            message: "Admin role required".to_string(),
        })
    }
}

/// API error with HTTP mapping for admin endpoints.
pub struct AdminApiError {
    status: StatusCode,
    code: String,
    message: String,
}

impl AdminApiError {
    fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl From<CatalogError> for AdminApiError {
    fn from(err: CatalogError) -> Self {
        let (status, code) = match &err {
            CatalogError::PlanNotFound(_) => (StatusCode::NOT_FOUND, "PLAN_NOT_FOUND"),
            CatalogError::DuplicateSlug(_) => (StatusCode::CONFLICT, "PLAN_EXISTS"),
            CatalogError::PlanInUse(_) => (StatusCode::CONFLICT, "PLAN_IN_USE"),
            CatalogError::SlugImmutable { .. } => (StatusCode::BAD_REQUEST, "SLUG_IMMUTABLE"),
            CatalogError::ValidationFailed(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            CatalogError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        Self {
            status,
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<crate::domain::foundation::DomainError> for AdminApiError {
    fn from(err: crate::domain::foundation::DomainError) -> Self {
        let (status, code) = match err.code {
            ErrorCode::TenantNotFound => (StatusCode::NOT_FOUND, "TENANT_NOT_FOUND"),
            ErrorCode::SubscriptionNotFound => (StatusCode::NOT_FOUND, "SUBSCRIPTION_NOT_FOUND"),
            ErrorCode::PlanNotFound => (StatusCode::NOT_FOUND, "PLAN_NOT_FOUND"),
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

impl IntoResponse for AdminApiError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorResponse::new(self.code, self.message);
        (self.status, Json(body)).into_response()
    }
}
