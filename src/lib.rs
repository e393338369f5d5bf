//! tfdrift - Terraform plan and drift analysis
//!
//! Runs `terraform` for plan/apply/state operations, classifies the resource
//! changes in its JSON plan output, scores drift severity and renders
//! human-readable reports.

pub mod cache;
pub mod config;
pub mod drift;
pub mod notify;
pub mod output;
pub mod plan;
pub mod terraform;

mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use drift::{ChangeSummary, Detector, DriftReport, Monitor, MonitorConfig, Severity};
pub use error::DriftError;
pub use plan::{ChangeKind, Plan, classify};
pub use terraform::{PlanOptions, TerraformCli, TerraformError, TerraformRunner};
