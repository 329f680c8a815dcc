//! Catalog error types.

use thiserror::Error;

use crate::domain::foundation::PlanSlug;

/// Errors from plan catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No plan with the given slug exists.
    #[error("Plan '{0}' not found")]
    PlanNotFound(PlanSlug),

    /// A plan with the given slug already exists.
    #[error("Plan '{0}' already exists")]
    DuplicateSlug(PlanSlug),

    /// Deletion refused because subscription records still reference the plan.
    #[error("Plan '{0}' is referenced by existing subscriptions and cannot be deleted")]
    PlanInUse(PlanSlug),

    /// Slugs are immutable after creation.
    #[error("Plan slug cannot be changed (attempted '{from}' -> '{to}')")]
    SlugImmutable { from: PlanSlug, to: PlanSlug },

    /// Invalid plan data.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Storage failure.
    #[error("Storage error: {0}")]
    Storage(String),
}
