use std::collections::BTreeMap;

use serde::Serialize;

use super::change::{ChangeKind, classify};
use super::types::Plan;

pub const ROOT_MODULE: &str = "root";

/// Plan-wide breakdown used by the `analyze` command.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanAnalysis {
    pub by_type: BTreeMap<String, usize>,
    pub by_provider: BTreeMap<String, usize>,
    pub by_module: BTreeMap<String, usize>,
    pub output_changes: BTreeMap<String, ChangeKind>,
    pub drifted: Vec<String>,
}

impl PlanAnalysis {
    pub fn from_plan(plan: &Plan) -> Self {
        let mut analysis = Self::default();

        for rc in plan.managed_changes().filter(|rc| rc.kind() != ChangeKind::NoOp) {
            *analysis.by_type.entry(rc.type_.clone()).or_default() += 1;
            *analysis
                .by_provider
                .entry(short_provider_name(&rc.provider_name).to_string())
                .or_default() += 1;
            let module = rc.module_address.as_deref().unwrap_or(ROOT_MODULE);
            *analysis.by_module.entry(module.to_string()).or_default() += 1;
        }

        analysis.output_changes = plan
            .output_changes
            .iter()
            .map(|(name, change)| (name.clone(), classify(&change.actions)))
            .collect();

        analysis.drifted = plan
            .resource_drift
            .iter()
            .map(|rc| rc.address.clone())
            .collect();

        analysis
    }

    pub fn has_changes(&self) -> bool {
        !self.by_type.is_empty() || self.output_changes.values().any(|k| *k != ChangeKind::NoOp)
    }
}

/// `registry.terraform.io/hashicorp/aws` -> `aws`
pub fn short_provider_name(provider: &str) -> &str {
    provider.rsplit('/').next().unwrap_or(provider)
}
