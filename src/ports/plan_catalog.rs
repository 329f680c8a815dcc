//! Plan catalog port.
//!
//! Admin-managed plan definitions plus the offer-id lookup the webhook
//! adapters use to resolve gateway offer codes to plans.

use async_trait::async_trait;

use crate::domain::catalog::{CatalogError, Plan};
use crate::domain::foundation::PlanSlug;

/// Port for plan catalog persistence.
#[async_trait]
pub trait PlanCatalog: Send + Sync {
    /// List all plans, active and inactive.
    async fn list(&self) -> Result<Vec<Plan>, CatalogError>;

    /// Find a plan by slug.
    async fn find_by_slug(&self, slug: &PlanSlug) -> Result<Option<Plan>, CatalogError>;

    /// Find the plan mapped to a gateway offer code.
    async fn find_by_offer_id(&self, offer_id: &str) -> Result<Option<Plan>, CatalogError>;

    /// Create a new plan.
    ///
    /// # Errors
    ///
    /// `DuplicateSlug` if the slug is taken.
    async fn create(&self, plan: &Plan) -> Result<(), CatalogError>;

    /// Update an existing plan. The slug is immutable and identifies the
    /// plan to update.
    ///
    /// # Errors
    ///
    /// `PlanNotFound` if no plan has the slug.
    async fn update(&self, plan: &Plan) -> Result<(), CatalogError>;

    /// Delete a plan.
    ///
    /// Callers must have checked the plan is unreferenced; implementations
    /// additionally fail with `PlanInUse` when a foreign key blocks the
    /// delete, closing the check-then-act race.
    async fn delete(&self, slug: &PlanSlug) -> Result<(), CatalogError>;
}
