//! ListPlansHandler - Query handler for the plan catalog.

use std::sync::Arc;

use crate::domain::catalog::{CatalogError, Plan};
use crate::ports::PlanCatalog;

/// Handler for listing plans.
pub struct ListPlansHandler {
    catalog: Arc<dyn PlanCatalog>,
}

impl ListPlansHandler {
    pub fn new(catalog: Arc<dyn PlanCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self) -> Result<Vec<Plan>, CatalogError> {
        self.catalog.list().await
    }
}
