//! DeletePlanHandler - Command handler for removing a plan.
//!
//! Deletion is refused while any subscription record references the plan.

use std::sync::Arc;

use crate::domain::catalog::CatalogError;
use crate::domain::foundation::PlanSlug;
use crate::ports::{PlanCatalog, SubscriptionStore};

/// Command to delete a plan by slug.
#[derive(Debug, Clone)]
pub struct DeletePlanCommand {
    pub slug: PlanSlug,
}

/// Handler for plan deletion.
pub struct DeletePlanHandler {
    catalog: Arc<dyn PlanCatalog>,
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl DeletePlanHandler {
    pub fn new(catalog: Arc<dyn PlanCatalog>, subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        Self {
            catalog,
            subscriptions,
        }
    }

    pub async fn handle(&self, cmd: DeletePlanCommand) -> Result<(), CatalogError> {
        let in_use = self
            .subscriptions
            .plan_in_use(&cmd.slug)
            .await
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        if in_use {
            return Err(CatalogError::PlanInUse(cmd.slug.clone()));
        }

        self.catalog.delete(&cmd.slug).await
    }
}
