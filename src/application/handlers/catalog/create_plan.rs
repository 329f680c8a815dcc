//! CreatePlanHandler - Command handler for adding a plan.

use std::sync::Arc;

use crate::domain::catalog::{CatalogError, Plan};
use crate::ports::PlanCatalog;

/// Command to create a plan. The command *is* the plan; slug validation
/// happened when the `PlanSlug` was constructed.
#[derive(Debug, Clone)]
pub struct CreatePlanCommand {
    pub plan: Plan,
}

/// Handler for plan creation.
pub struct CreatePlanHandler {
    catalog: Arc<dyn PlanCatalog>,
}

impl CreatePlanHandler {
    pub fn new(catalog: Arc<dyn PlanCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, cmd: CreatePlanCommand) -> Result<Plan, CatalogError> {
        if cmd.plan.name.trim().is_empty() {
            return Err(CatalogError::ValidationFailed(
                "Plan name cannot be empty".to_string(),
            ));
        }
        if cmd.plan.price_cents < 0 {
            return Err(CatalogError::ValidationFailed(
                "Plan price cannot be negative".to_string(),
            ));
        }

        if self.catalog.find_by_slug(&cmd.plan.slug).await?.is_some() {
            return Err(CatalogError::DuplicateSlug(cmd.plan.slug.clone()));
        }

        self.catalog.create(&cmd.plan).await?;
        Ok(cmd.plan)
    }
}
