use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::PlanError;
use super::change::{ChangeKind, classify};

/// Machine-readable plan as emitted by `terraform show -json <planfile>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub format_version: Option<String>,
    #[serde(default)]
    pub terraform_version: Option<String>,
    #[serde(default)]
    pub resource_changes: Vec<ResourceChange>,
    #[serde(default)]
    pub resource_drift: Vec<ResourceChange>,
    #[serde(default)]
    pub output_changes: BTreeMap<String, Change>,
    #[serde(default)]
    pub errored: bool,
}

impl Plan {
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        serde_json::from_str(json).map_err(PlanError::Parse)
    }

    pub fn from_path(path: &Path) -> Result<Self, PlanError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PlanError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Data-source reads are not infrastructure changes and are skipped.
    pub fn managed_changes(&self) -> impl Iterator<Item = &ResourceChange> {
        self.resource_changes
            .iter()
            .filter(|rc| rc.mode == ResourceMode::Managed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceMode {
    #[default]
    Managed,
    Data,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    pub address: String,
    #[serde(default)]
    pub module_address: Option<String>,
    #[serde(default)]
    pub mode: ResourceMode,
    #[serde(rename = "type")]
    pub type_: String,
    pub name: String,
    #[serde(default)]
    pub index: Option<serde_json::Value>,
    #[serde(default)]
    pub provider_name: String,
    pub change: Change,
    #[serde(default)]
    pub action_reason: Option<String>,
}

impl ResourceChange {
    pub fn kind(&self) -> ChangeKind {
        self.change.kind()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub before: serde_json::Value,
    #[serde(default)]
    pub after: serde_json::Value,
    #[serde(default)]
    pub after_unknown: serde_json::Value,
    #[serde(default)]
    pub before_sensitive: serde_json::Value,
    #[serde(default)]
    pub after_sensitive: serde_json::Value,
    #[serde(default)]
    pub replace_paths: Option<serde_json::Value>,
}

impl Change {
    pub fn kind(&self) -> ChangeKind {
        classify(&self.actions)
    }
}
