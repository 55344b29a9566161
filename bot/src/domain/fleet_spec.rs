//! Typed description of the fleet request `start_fleet` submits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// Launch template version used when the spec does not pin one.
pub const LATEST_VERSION: &str = "$Latest";

/// Fleet request template. The fleet is always created with target
/// capacity 0; `start` raises it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FleetSpec {
    pub launch_template: LaunchTemplateRef,
    #[serde(default)]
    pub overrides: Vec<LaunchOverride>,
    #[serde(default)]
    pub capacity_type: CapacityType,
    #[serde(default)]
    pub fleet_type: FleetType,
    #[serde(default)]
    pub allocation_strategy: Option<String>,
    #[serde(default)]
    pub interruption_behavior: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Launch template reference: exactly one of id or name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaunchTemplateRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    LATEST_VERSION.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaunchOverride {
    #[serde(default)]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub subnet_id: Option<String>,
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub max_price: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapacityType {
    #[default]
    Spot,
    OnDemand,
}

impl CapacityType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spot => "spot",
            Self::OnDemand => "on-demand",
        }
    }
}

/// Fleet request types whose capacity can start at 0 and be modified later.
/// `instant` fleets can do neither, so they are not accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FleetType {
    #[default]
    Maintain,
    Request,
}

impl FleetType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Maintain => "maintain",
            Self::Request => "request",
        }
    }
}

impl FleetSpec {
    /// Checks the invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidFleetSpec` naming the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lt = &self.launch_template;
        match (lt.id.as_deref(), lt.name.as_deref()) {
            (None, None) => {
                return Err(invalid("launch_template needs an id or a name"));
            }
            (Some(_), Some(_)) => {
                return Err(invalid("launch_template takes an id or a name, not both"));
            }
            (Some(v), None) | (None, Some(v)) if v.trim().is_empty() => {
                return Err(invalid("launch_template id/name must not be empty"));
            }
            _ => {}
        }
        if lt.version.trim().is_empty() {
            return Err(invalid("launch_template version must not be empty"));
        }
        if self.tags.keys().any(|k| k.trim().is_empty()) {
            return Err(invalid("tag keys must not be empty"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::InvalidFleetSpec(reason.to_string())
}
