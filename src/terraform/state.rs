use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::plan::{ResourceMode, redact_sensitive};

/// State as emitted by `terraform show -json` (no plan file argument).
///
/// A workspace with no state yet is reported without a `values` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub format_version: Option<String>,
    #[serde(default)]
    pub terraform_version: Option<String>,
    #[serde(default)]
    pub values: Option<StateValues>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateValues {
    #[serde(default)]
    pub outputs: BTreeMap<String, StateOutput>,
    #[serde(default)]
    pub root_module: StateModule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateOutput {
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub sensitive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateModule {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub resources: Vec<StateResource>,
    #[serde(default)]
    pub child_modules: Vec<StateModule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateResource {
    pub address: String,
    #[serde(default)]
    pub mode: ResourceMode,
    #[serde(rename = "type")]
    pub type_: String,
    pub name: String,
    #[serde(default)]
    pub provider_name: String,
    #[serde(default)]
    pub values: serde_json::Value,
    #[serde(default)]
    pub sensitive_values: serde_json::Value,
}

impl StateDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Every resource in the state, root module first, then child modules depth-first.
    pub fn resources(&self) -> Vec<&StateResource> {
        let mut out = Vec::new();
        if let Some(values) = &self.values {
            collect(&values.root_module, &mut out);
        }
        out
    }

    pub fn addresses(&self) -> Vec<&str> {
        self.resources().into_iter().map(|r| r.address.as_str()).collect()
    }

    pub fn find(&self, address: &str) -> Option<&StateResource> {
        self.resources().into_iter().find(|r| r.address == address)
    }
}

impl StateResource {
    /// Copy safe to print: every value flagged in `sensitive_values` is masked.
    pub fn redacted(&self) -> Self {
        Self {
            values: redact_sensitive(&self.values, &self.sensitive_values),
            ..self.clone()
        }
    }
}

fn collect<'a>(module: &'a StateModule, out: &mut Vec<&'a StateResource>) {
    out.extend(module.resources.iter());
    for child in &module.child_modules {
        collect(child, out);
    }
}
