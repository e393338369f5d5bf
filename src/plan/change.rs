use std::fmt;

use serde::{Deserialize, Serialize};

use super::diff::{AttributeChange, attribute_changes};
use super::types::ResourceChange;

/// Net effect of a resource change once Terraform's action list is collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
    Replace,
    NoOp,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 5] = [
        ChangeKind::Create,
        ChangeKind::Update,
        ChangeKind::Delete,
        ChangeKind::Replace,
        ChangeKind::NoOp,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            ChangeKind::Create => "+",
            ChangeKind::Update => "~",
            ChangeKind::Delete => "-",
            ChangeKind::Replace => "-/+",
            ChangeKind::NoOp => " ",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Create => "create",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
            ChangeKind::Replace => "replace",
            ChangeKind::NoOp => "no-op",
        }
    }

    pub fn is_destructive(self) -> bool {
        matches!(self, ChangeKind::Delete | ChangeKind::Replace)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Collapses a Terraform `actions` list into a single [`ChangeKind`].
///
/// Terraform reports replacement as `["delete", "create"]` or
/// `["create", "delete"]` (create-before-destroy); both become `Replace`.
/// `["read"]`, `["no-op"]`, an empty list and unrecognized actions all
/// classify as `NoOp`.
pub fn classify<S: AsRef<str>>(actions: &[S]) -> ChangeKind {
    let has = |name: &str| actions.iter().any(|a| a.as_ref() == name);

    match (has("create"), has("delete")) {
        (true, true) => ChangeKind::Replace,
        (true, false) => ChangeKind::Create,
        (false, true) => ChangeKind::Delete,
        (false, false) if has("update") => ChangeKind::Update,
        _ => ChangeKind::NoOp,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedChange {
    pub address: String,
    pub resource_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_address: Option<String>,
    pub kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_reason: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeChange>,
}

impl From<&ResourceChange> for ClassifiedChange {
    fn from(rc: &ResourceChange) -> Self {
        let kind = rc.kind();
        let attributes = if kind == ChangeKind::NoOp {
            Vec::new()
        } else {
            attribute_changes(&rc.change)
        };

        Self {
            address: rc.address.clone(),
            resource_type: rc.type_.clone(),
            name: rc.name.clone(),
            module_address: rc.module_address.clone(),
            kind,
            action_reason: rc.action_reason.clone(),
            attributes,
        }
    }
}
