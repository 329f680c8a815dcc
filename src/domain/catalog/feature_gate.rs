//! Feature gating.
//!
//! Maps the tenant's current plan to a capability set and denies gated
//! operations with an error the UI can turn into an upsell rather than a
//! generic failure. Administrative sessions bypass all feature checks.

use thiserror::Error;

use super::plan::{Feature, PlanFeatures};

/// Role of the caller, as established by the auth collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Tenant,
    Admin,
}

/// Denial raised when a plan does not include a feature.
///
/// Carries the feature name so the caller can present a targeted upsell.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Feature '{feature}' is not available on the current plan")]
pub struct FeatureNotAvailable {
    pub feature: Feature,
}

/// Checks whether the given plan capabilities allow a feature.
///
/// Admins bypass every check.
pub fn check_feature(
    features: &PlanFeatures,
    feature: Feature,
    role: Role,
) -> Result<(), FeatureNotAvailable> {
    if role == Role::Admin {
        return Ok(());
    }
    if features.enabled(feature) {
        Ok(())
    } else {
        Err(FeatureNotAvailable { feature })
    }
}
