//! Integration tests for the webhook-to-entitlement flow.
//!
//! Drives the real router with in-memory port implementations:
//! 1. Gateway deliveries mutate the subscription record per contract
//! 2. The access gate answers from stored state alone
//! 3. Response codes follow each gateway's retry contract

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower::util::ServiceExt;

use vitala::adapters::http::{api_router, require_subscription, AppState};
use vitala::config::BillingConfig;
use vitala::domain::billing::SubscriptionRecord;
use vitala::domain::catalog::{CatalogError, Plan, PlanFeatures, PlanLimits};
use vitala::domain::foundation::{
    DomainError, EmailAddress, ErrorCode, PlanSlug, TenantId, Timestamp,
};
use vitala::ports::{
    BillingNotice, BillingNotifier, BillingSettings, BillingSettingsStore, PlanCatalog,
    SubscriptionStore, TenantAccount, TenantDirectory, UpdateOutcome,
};

const HOTTOK: &str = "hottok-integration-test";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct InMemorySubscriptions {
    records: Mutex<HashMap<TenantId, SubscriptionRecord>>,
}

impl InMemorySubscriptions {
    fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    fn get(&self, tenant_id: &TenantId) -> Option<SubscriptionRecord> {
        self.records.lock().unwrap().get(tenant_id).cloned()
    }

    fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptions {
    async fn find_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        Ok(self.records.lock().unwrap().get(tenant_id).cloned())
    }

    async fn find_by_external_subscription(
        &self,
        subscription_code: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.external_subscription_id.as_deref() == Some(subscription_code))
            .cloned())
    }

    async fn insert(&self, record: &SubscriptionRecord) -> Result<(), DomainError> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.tenant_id) {
            return Err(DomainError::new(
                ErrorCode::ConcurrentUpdateConflict,
                "Tenant already has a subscription record",
            ));
        }
        records.insert(record.tenant_id, record.clone());
        Ok(())
    }

    async fn update_guarded(
        &self,
        record: &SubscriptionRecord,
        expected_updated_at: Timestamp,
    ) -> Result<UpdateOutcome, DomainError> {
        let mut records = self.records.lock().unwrap();
        match records.get(&record.tenant_id) {
            Some(stored) if stored.updated_at == expected_updated_at => {
                records.insert(record.tenant_id, record.clone());
                Ok(UpdateOutcome::Updated)
            }
            _ => Ok(UpdateOutcome::Conflict),
        }
    }

    async fn plan_in_use(&self, slug: &PlanSlug) -> Result<bool, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .any(|r| r.plan_slug.as_ref() == Some(slug)))
    }
}

struct InMemoryTenants {
    accounts: Vec<TenantAccount>,
}

#[async_trait]
impl TenantDirectory for InMemoryTenants {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<TenantAccount>, DomainError> {
        Ok(self.accounts.iter().find(|a| &a.email == email).cloned())
    }

    async fn find_by_id(&self, id: &TenantId) -> Result<Option<TenantAccount>, DomainError> {
        Ok(self.accounts.iter().find(|a| &a.id == id).cloned())
    }
}

struct InMemoryPlans {
    plans: Mutex<Vec<Plan>>,
}

#[async_trait]
impl PlanCatalog for InMemoryPlans {
    async fn list(&self) -> Result<Vec<Plan>, CatalogError> {
        Ok(self.plans.lock().unwrap().clone())
    }

    async fn find_by_slug(&self, slug: &PlanSlug) -> Result<Option<Plan>, CatalogError> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .iter()
            .find(|p| &p.slug == slug)
            .cloned())
    }

    async fn find_by_offer_id(&self, offer_id: &str) -> Result<Option<Plan>, CatalogError> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.external_offer_id.as_deref() == Some(offer_id))
            .cloned())
    }

    async fn create(&self, plan: &Plan) -> Result<(), CatalogError> {
        self.plans.lock().unwrap().push(plan.clone());
        Ok(())
    }

    async fn update(&self, plan: &Plan) -> Result<(), CatalogError> {
        let mut plans = self.plans.lock().unwrap();
        match plans.iter_mut().find(|p| p.slug == plan.slug) {
            Some(stored) => {
                *stored = plan.clone();
                Ok(())
            }
            None => Err(CatalogError::PlanNotFound(plan.slug.clone())),
        }
    }

    async fn delete(&self, slug: &PlanSlug) -> Result<(), CatalogError> {
        let mut plans = self.plans.lock().unwrap();
        let before = plans.len();
        plans.retain(|p| &p.slug != slug);
        if plans.len() == before {
            return Err(CatalogError::PlanNotFound(slug.clone()));
        }
        Ok(())
    }
}

struct InMemorySettings {
    settings: Mutex<BillingSettings>,
}

#[async_trait]
impl BillingSettingsStore for InMemorySettings {
    async fn get(&self) -> Result<BillingSettings, DomainError> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn put(&self, settings: &BillingSettings) -> Result<(), DomainError> {
        *self.settings.lock().unwrap() = settings.clone();
        Ok(())
    }
}

struct NullNotifier;

#[async_trait]
impl BillingNotifier for NullNotifier {
    async fn notify(&self, _notice: BillingNotice) {}
}

// =============================================================================
// Fixture
// =============================================================================

fn slug(s: &str) -> PlanSlug {
    PlanSlug::new(s).unwrap()
}

fn pro_plan() -> Plan {
    Plan {
        slug: slug("pro"),
        name: "Pro".to_string(),
        price_cents: 4900,
        limits: PlanLimits {
            max_clients: None,
            max_monthly_intake_forms: None,
        },
        features: PlanFeatures {
            client_portal: true,
            intake_forms: true,
            custom_branding: true,
            data_export: true,
        },
        external_offer_id: Some("k9meix5y".to_string()),
        active: true,
    }
}

fn essential_plan() -> Plan {
    Plan {
        slug: slug("essential"),
        name: "Essential".to_string(),
        price_cents: 1900,
        limits: PlanLimits {
            max_clients: Some(30),
            max_monthly_intake_forms: Some(50),
        },
        features: PlanFeatures {
            client_portal: true,
            intake_forms: true,
            ..Default::default()
        },
        external_offer_id: None,
        active: true,
    }
}

struct TestApp {
    state: AppState,
    subscriptions: Arc<InMemorySubscriptions>,
    tenant_id: TenantId,
}

fn test_app() -> TestApp {
    let tenant_id = TenantId::new();
    let subscriptions = Arc::new(InMemorySubscriptions::new());

    let state = AppState {
        subscriptions: subscriptions.clone(),
        tenants: Arc::new(InMemoryTenants {
            accounts: vec![TenantAccount {
                id: tenant_id,
                email: EmailAddress::new("ana@example.com").unwrap(),
            }],
        }),
        plans: Arc::new(InMemoryPlans {
            plans: Mutex::new(vec![essential_plan(), pro_plan()]),
        }),
        settings: Arc::new(InMemorySettings {
            settings: Mutex::new(BillingSettings {
                hotmart_webhook_token: Some(HOTTOK.to_string()),
                ..Default::default()
            }),
        }),
        notifier: Arc::new(NullNotifier),
        billing: BillingConfig::default(),
    };

    TestApp {
        state,
        subscriptions,
        tenant_id,
    }
}

fn router(app: &TestApp) -> Router {
    api_router().with_state(app.state.clone())
}

fn hotmart_purchase(event: &str, transaction: &str, occurred_millis: i64) -> serde_json::Value {
    serde_json::json!({
        "id": format!("notif-{}", transaction),
        "event": event,
        "creation_date": occurred_millis,
        "data": {
            "product": { "id": 788221 },
            "buyer": { "email": "Ana@Example.com" },
            "purchase": {
                "transaction": transaction,
                "status": "APPROVED",
                "approved_date": occurred_millis,
                "recurrence_number": 1,
                "offer": { "code": "k9meix5y" }
            },
            "subscription": { "subscriber": { "code": "SUBR-42" } }
        }
    })
}

async fn deliver_hotmart(
    app: &TestApp,
    payload: &serde_json::Value,
    token: Option<&str>,
) -> StatusCode {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/webhooks/hotmart")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("X-Hotmart-Hottok", token);
    }
    let request = builder
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap();

    router(app).oneshot(request).await.unwrap().status()
}

async fn get_entitlement(app: &TestApp) -> serde_json::Value {
    let request = Request::builder()
        .uri("/api/billing/entitlement")
        .header("X-Tenant-Id", app.tenant_id.to_string())
        .body(Body::empty())
        .unwrap();

    let response = router(app).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Webhook Flow Tests
// =============================================================================

#[tokio::test]
async fn approved_purchase_activates_mapped_plan_and_grants_access() {
    let app = test_app();

    let status = deliver_hotmart(
        &app,
        &hotmart_purchase("PURCHASE_APPROVED", "HP-1", 1_700_000_000_000),
        Some(HOTTOK),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let record = app.subscriptions.get(&app.tenant_id).unwrap();
    assert_eq!(record.plan_slug, Some(slug("pro")));
    assert_eq!(record.external_transaction_id.as_deref(), Some("HP-1"));

    let entitlement = get_entitlement(&app).await;
    assert_eq!(entitlement["granted"], true);
    assert_eq!(entitlement["plan_slug"], "pro");
}

#[tokio::test]
async fn duplicate_delivery_leaves_record_unchanged() {
    let app = test_app();
    let payload = hotmart_purchase("PURCHASE_APPROVED", "HP-DUP", 1_700_000_000_000);

    assert_eq!(deliver_hotmart(&app, &payload, Some(HOTTOK)).await, StatusCode::OK);
    let after_first = app.subscriptions.get(&app.tenant_id).unwrap();

    assert_eq!(deliver_hotmart(&app, &payload, Some(HOTTOK)).await, StatusCode::OK);
    let after_second = app.subscriptions.get(&app.tenant_id).unwrap();

    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn refund_revokes_access_immediately() {
    let app = test_app();

    deliver_hotmart(
        &app,
        &hotmart_purchase("PURCHASE_APPROVED", "HP-PAY", 1_700_000_000_000),
        Some(HOTTOK),
    )
    .await;
    assert_eq!(get_entitlement(&app).await["granted"], true);

    let status = deliver_hotmart(
        &app,
        &hotmart_purchase("PURCHASE_REFUNDED", "HP-REFUND", 1_700_000_100_000),
        Some(HOTTOK),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let entitlement = get_entitlement(&app).await;
    assert_eq!(entitlement["granted"], false);
    assert_eq!(entitlement["reason"], "subscription_refunded");
}

#[tokio::test]
async fn unknown_buyer_is_acknowledged_without_mutation() {
    let app = test_app();

    let mut payload = hotmart_purchase("PURCHASE_APPROVED", "HP-GHOST", 1_700_000_000_000);
    payload["data"]["buyer"]["email"] = serde_json::json!("nobody@example.com");

    let status = deliver_hotmart(&app, &payload, Some(HOTTOK)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.subscriptions.count(), 0);
}

#[tokio::test]
async fn bad_token_is_rejected_before_any_processing() {
    let app = test_app();

    let status = deliver_hotmart(
        &app,
        &hotmart_purchase("PURCHASE_APPROVED", "HP-EVIL", 1_700_000_000_000),
        Some("wrong-token"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.subscriptions.count(), 0);
}

#[tokio::test]
async fn malformed_payload_is_acknowledged_after_auth() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/hotmart")
        .header("X-Hotmart-Hottok", HOTTOK)
        .body(Body::from("not json at all"))
        .unwrap();

    let response = router(&app).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.subscriptions.count(), 0);
}

#[tokio::test]
async fn cancellation_resolves_by_subscriber_code_alone() {
    let app = test_app();

    deliver_hotmart(
        &app,
        &hotmart_purchase("PURCHASE_APPROVED", "HP-FIRST", 1_700_000_000_000),
        Some(HOTTOK),
    )
    .await;

    // Cancellation without buyer email; only the subscriber code matches.
    let payload = serde_json::json!({
        "id": "notif-cancel",
        "event": "SUBSCRIPTION_CANCELLATION",
        "creation_date": 1_700_000_200_000i64,
        "data": {
            "subscription": { "subscriber": { "code": "SUBR-42" } }
        }
    });

    assert_eq!(deliver_hotmart(&app, &payload, Some(HOTTOK)).await, StatusCode::OK);

    let entitlement = get_entitlement(&app).await;
    assert_eq!(entitlement["granted"], false);
    assert_eq!(entitlement["reason"], "subscription_cancelled");
}

// =============================================================================
// Trial Flow Tests
// =============================================================================

#[tokio::test]
async fn registration_trial_grants_access_at_once() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/billing/trial")
        .header("X-Tenant-Id", app.tenant_id.to_string())
        .body(Body::empty())
        .unwrap();

    let response = router(&app).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let entitlement = get_entitlement(&app).await;
    assert_eq!(entitlement["granted"], true);
    assert_eq!(entitlement["plan_slug"], "essential");
}

#[tokio::test]
async fn tenant_without_record_is_denied_with_billing_code() {
    let app = test_app();

    let entitlement = get_entitlement(&app).await;
    assert_eq!(entitlement["granted"], false);
    assert_eq!(entitlement["reason"], "subscription_required");
}

// =============================================================================
// Access Gate Middleware Tests
// =============================================================================

fn protected_router(app: &TestApp) -> Router {
    Router::new()
        .route("/protected", get(|| async { "content" }))
        .route_layer(middleware::from_fn_with_state(
            app.state.clone(),
            require_subscription,
        ))
        .with_state(app.state.clone())
}

#[tokio::test]
async fn gate_denies_with_402_distinct_from_auth_failure() {
    let app = test_app();

    // No identity at all: 401.
    let anonymous = Request::builder()
        .uri("/protected")
        .body(Body::empty())
        .unwrap();
    let response = protected_router(&app).oneshot(anonymous).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Authenticated but unsubscribed: 402 with a billing routing code.
    let unsubscribed = Request::builder()
        .uri("/protected")
        .header("X-Tenant-Id", app.tenant_id.to_string())
        .body(Body::empty())
        .unwrap();
    let response = protected_router(&app).oneshot(unsubscribed).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "SUBSCRIPTION_REQUIRED");
}

#[tokio::test]
async fn gate_admits_paid_tenant() {
    let app = test_app();

    deliver_hotmart(
        &app,
        &hotmart_purchase("PURCHASE_APPROVED", "HP-GATE", 1_700_000_000_000),
        Some(HOTTOK),
    )
    .await;

    let request = Request::builder()
        .uri("/protected")
        .header("X-Tenant-Id", app.tenant_id.to_string())
        .body(Body::empty())
        .unwrap();
    let response = protected_router(&app).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Admin Surface Tests
// =============================================================================

async fn admin_request(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    admin: bool,
) -> axum::response::Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Tenant-Id", app.tenant_id.to_string());
    if admin {
        builder = builder.header("X-Role", "admin");
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };

    router(app)
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn non_admin_is_forbidden_from_admin_surface() {
    let app = test_app();
    let response = admin_request(&app, "GET", "/api/admin/plans", None, false).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_create_and_list_plans() {
    let app = test_app();

    let response = admin_request(
        &app,
        "POST",
        "/api/admin/plans",
        Some(serde_json::json!({
            "slug": "studio",
            "name": "Studio",
            "price_cents": 9900,
            "features": { "client_portal": true, "data_export": true }
        })),
        true,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = admin_request(&app, "GET", "/api/admin/plans", None, true).await;
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let plans: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(plans.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn deleting_a_plan_in_use_is_refused() {
    let app = test_app();

    // Activate the pro plan for the tenant first.
    deliver_hotmart(
        &app,
        &hotmart_purchase("PURCHASE_APPROVED", "HP-USE", 1_700_000_000_000),
        Some(HOTTOK),
    )
    .await;

    let response = admin_request(&app, "DELETE", "/api/admin/plans/pro", None, true).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "PLAN_IN_USE");
}

#[tokio::test]
async fn trial_extension_restores_access_for_expired_tenant() {
    let app = test_app();

    // An expired tenant: trial opened long in the past.
    let record = SubscriptionRecord::start_trial(
        app.tenant_id,
        slug("essential"),
        14,
        Timestamp::from_unix_secs(1_000_000),
    );
    app.subscriptions.insert(&record).await.unwrap();
    assert_eq!(get_entitlement(&app).await["granted"], false);

    let response = admin_request(
        &app,
        "POST",
        &format!("/api/admin/tenants/{}/trial-extension", app.tenant_id),
        Some(serde_json::json!({ "days": 7 })),
        true,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(get_entitlement(&app).await["granted"], true);
}

#[tokio::test]
async fn admin_can_update_billing_settings() {
    let app = test_app();

    let response = admin_request(
        &app,
        "PUT",
        "/api/admin/billing-settings",
        Some(serde_json::json!({
            "hotmart_webhook_token": "hottok-rotated",
            "checkout_url": "https://pay.hotmart.com/vitala"
        })),
        true,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Old token no longer authenticates.
    let status = deliver_hotmart(
        &app,
        &hotmart_purchase("PURCHASE_APPROVED", "HP-NEW", 1_700_000_000_000),
        Some(HOTTOK),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The rotated one does.
    let status = deliver_hotmart(
        &app,
        &hotmart_purchase("PURCHASE_APPROVED", "HP-NEW", 1_700_000_000_000),
        Some("hottok-rotated"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
