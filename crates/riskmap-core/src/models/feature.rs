//! Simplified feature model.
//!
//! Input features arrive with schema-less property maps; the pipeline
//! projects them onto the closed [`RiskProperties`] record and hands the
//! result to the consumer as [`SimplifiedFeature`] values.

use geojson::JsonObject;
use serde::{Deserialize, Serialize};

/// The fixed property schema of delivered features.
///
/// Every field is optional; anything outside the allow-list is dropped by
/// the projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProperties {
    /// Risk classification code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_class: Option<String>,

    /// Display color associated with the risk class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// District name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    /// Resident population of the feature's area
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
}

impl RiskProperties {
    /// Project an open property map onto the fixed record.
    ///
    /// Missing or wrongly-typed values default to `None`.
    pub fn project(properties: Option<&JsonObject>) -> Self {
        let Some(props) = properties else {
            return Self::default();
        };

        Self {
            risk_class: string_field(props, "risk_class"),
            color: string_field(props, "color"),
            district: string_field(props, "district"),
            population: props.get("population").and_then(|v| v.as_u64()),
        }
    }
}

fn string_field(props: &JsonObject, key: &str) -> Option<String> {
    props.get(key).and_then(|v| v.as_str()).map(String::from)
}

/// One feature after simplification, ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedFeature {
    pub geometry: Option<geojson::Geometry>,
    pub properties: RiskProperties,
}
