//! UpdatePlanHandler - Command handler for editing a plan.
//!
//! The slug is the immutable identity: the command addresses a plan by
//! slug and there is no way to express a rename.

use std::sync::Arc;

use crate::domain::catalog::{CatalogError, Plan, PlanFeatures, PlanLimits};
use crate::domain::foundation::PlanSlug;
use crate::ports::PlanCatalog;

/// Command to update the mutable fields of a plan.
#[derive(Debug, Clone)]
pub struct UpdatePlanCommand {
    pub slug: PlanSlug,
    pub name: String,
    pub price_cents: i64,
    pub limits: PlanLimits,
    pub features: PlanFeatures,
    pub external_offer_id: Option<String>,
    pub active: bool,
}

/// Handler for plan updates.
pub struct UpdatePlanHandler {
    catalog: Arc<dyn PlanCatalog>,
}

impl UpdatePlanHandler {
    pub fn new(catalog: Arc<dyn PlanCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, cmd: UpdatePlanCommand) -> Result<Plan, CatalogError> {
        if cmd.name.trim().is_empty() {
            return Err(CatalogError::ValidationFailed(
                "Plan name cannot be empty".to_string(),
            ));
        }
        if cmd.price_cents < 0 {
            return Err(CatalogError::ValidationFailed(
                "Plan price cannot be negative".to_string(),
            ));
        }

        if self.catalog.find_by_slug(&cmd.slug).await?.is_none() {
            return Err(CatalogError::PlanNotFound(cmd.slug.clone()));
        }

        let plan = Plan {
            slug: cmd.slug,
            name: cmd.name,
            price_cents: cmd.price_cents,
            limits: cmd.limits,
            features: cmd.features,
            external_offer_id: cmd.external_offer_id,
            active: cmd.active,
        };

        self.catalog.update(&plan).await?;
        Ok(plan)
    }
}
