//! Plan definitions.
//!
//! A Plan bundles price, usage limits, and feature flags under an immutable
//! slug. Gateway offer codes map onto plans through `external_offer_id`.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::PlanSlug;

/// A purchasable plan in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Immutable identity; subscription records reference this.
    pub slug: PlanSlug,

    /// Display name.
    pub name: String,

    /// Monthly price in cents (not floats).
    pub price_cents: i64,

    /// Usage limits.
    pub limits: PlanLimits,

    /// Feature flags.
    pub features: PlanFeatures,

    /// Gateway product/offer code mapped to this plan, if sold externally.
    pub external_offer_id: Option<String>,

    /// Inactive plans are hidden from new checkouts but keep serving
    /// existing subscribers.
    pub active: bool,
}

/// Usage limits for a plan. `None` = unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Maximum managed clients.
    pub max_clients: Option<u32>,

    /// Maximum intake forms per month.
    pub max_monthly_intake_forms: Option<u32>,
}

impl PlanLimits {
    /// Check if the client limit has been reached.
    ///
    /// Returns false if unlimited or under limit.
    pub fn client_limit_reached(&self, current_clients: u32) -> bool {
        self.max_clients
            .map(|max| current_clients >= max)
            .unwrap_or(false)
    }

    /// Check if the monthly intake form limit has been reached.
    pub fn intake_form_limit_reached(&self, current_forms: u32) -> bool {
        self.max_monthly_intake_forms
            .map(|max| current_forms >= max)
            .unwrap_or(false)
    }
}

/// Named boolean capability set for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanFeatures {
    /// Client-facing portal with shared documents.
    #[serde(default)]
    pub client_portal: bool,

    /// Wellness intake forms.
    #[serde(default)]
    pub intake_forms: bool,

    /// Custom logo and colors on tenant pages.
    #[serde(default)]
    pub custom_branding: bool,

    /// CSV/PDF export of client data.
    #[serde(default)]
    pub data_export: bool,
}

impl PlanFeatures {
    /// Returns whether the named feature is enabled.
    pub fn enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::ClientPortal => self.client_portal,
            Feature::IntakeForms => self.intake_forms,
            Feature::CustomBranding => self.custom_branding,
            Feature::DataExport => self.data_export,
        }
    }
}

/// Gateable features, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    ClientPortal,
    IntakeForms,
    CustomBranding,
    DataExport,
}

impl Feature {
    /// Parses a feature name as used in URLs and denial payloads.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "client_portal" => Some(Self::ClientPortal),
            "intake_forms" => Some(Self::IntakeForms),
            "custom_branding" => Some(Self::CustomBranding),
            "data_export" => Some(Self::DataExport),
            _ => None,
        }
    }

    /// The feature name as used in URLs and denial payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientPortal => "client_portal",
            Self::IntakeForms => "intake_forms",
            Self::CustomBranding => "custom_branding",
            Self::DataExport => "data_export",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pro_plan() -> Plan {
        Plan {
            slug: PlanSlug::new("pro").unwrap(),
            name: "Pro".to_string(),
            price_cents: 4900,
            limits: PlanLimits {
                max_clients: Some(200),
                max_monthly_intake_forms: None,
            },
            features: PlanFeatures {
                client_portal: true,
                intake_forms: true,
                custom_branding: true,
                data_export: true,
            },
            external_offer_id: Some("offer-pro-2024".to_string()),
            active: true,
        }
    }

    #[test]
    fn client_limit_reached_when_at_max() {
        let plan = pro_plan();
        assert!(plan.limits.client_limit_reached(200));
        assert!(plan.limits.client_limit_reached(300));
    }

    #[test]
    fn client_limit_not_reached_when_under() {
        let plan = pro_plan();
        assert!(!plan.limits.client_limit_reached(199));
    }

    #[test]
    fn unlimited_intake_forms_never_reached() {
        let plan = pro_plan();
        assert!(!plan.limits.intake_form_limit_reached(100_000));
    }

    #[test]
    fn features_answer_by_name() {
        let plan = pro_plan();
        assert!(plan.features.enabled(Feature::ClientPortal));
        assert!(plan.features.enabled(Feature::DataExport));
    }

    #[test]
    fn default_features_are_all_disabled() {
        let features = PlanFeatures::default();
        for feature in [
            Feature::ClientPortal,
            Feature::IntakeForms,
            Feature::CustomBranding,
            Feature::DataExport,
        ] {
            assert!(!features.enabled(feature));
        }
    }

    #[test]
    fn feature_parse_roundtrips() {
        for feature in [
            Feature::ClientPortal,
            Feature::IntakeForms,
            Feature::CustomBranding,
            Feature::DataExport,
        ] {
            assert_eq!(Feature::parse(feature.as_str()), Some(feature));
        }
    }

    #[test]
    fn feature_parse_rejects_unknown() {
        assert_eq!(Feature::parse("telepathy"), None);
    }

    #[test]
    fn feature_serializes_snake_case() {
        let json = serde_json::to_string(&Feature::ClientPortal).unwrap();
        assert_eq!(json, "\"client_portal\"");
    }
}
