//! Pickable regions and name-based role assignment
//!
//! Meshes of the loaded model are assigned to a region by matching their
//! names against a keyword table. The table order is also the priority
//! order used when several regions are under the pointer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Region identifier (e.g., "technology")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A keyword rule mapping mesh names to a region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRule {
    pub role: RegionId,
    /// Case-insensitive substrings matched against mesh names
    pub keywords: Vec<String>,
    /// Page opened when the region is clicked
    pub target: String,
    /// Tooltip shown while hovering
    #[serde(default)]
    pub tooltip: String,
}

impl RegionRule {
    /// Check whether a mesh name contains any of the rule's keywords
    pub fn matches(&self, mesh_name: &str) -> bool {
        let name = mesh_name.to_lowercase();
        self.keywords
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| name.contains(k.as_str()))
    }
}

/// A region registered with the interaction controller
///
/// The meshes belonging to the region live in the engine's scene graph and
/// are looked up by `id` when hit testing.
#[derive(Debug, Clone, PartialEq)]
pub struct PickableRegion {
    pub id: RegionId,
    pub target: String,
    pub tooltip: String,
}

impl From<&RegionRule> for PickableRegion {
    fn from(rule: &RegionRule) -> Self {
        Self {
            id: rule.role.clone(),
            target: rule.target.clone(),
            tooltip: rule.tooltip.clone(),
        }
    }
}

/// Ordered table of region rules
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    rules: Vec<RegionRule>,
}

impl RoleTable {
    /// Build a table, normalizing keywords to lowercase
    pub fn new(rules: Vec<RegionRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|mut rule| {
                rule.keywords = rule
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .collect();
                rule
            })
            .collect();
        Self { rules }
    }

    /// First rule whose keywords match the mesh name
    pub fn classify(&self, mesh_name: &str) -> Option<&RegionRule> {
        self.rules.iter().find(|rule| rule.matches(mesh_name))
    }

    pub fn rules(&self) -> &[RegionRule] {
        &self.rules
    }
}
