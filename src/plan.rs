//! Terraform JSON plan model, change classification and attribute diffs.

mod analysis;
mod change;
mod diff;
mod error;
mod types;

pub use analysis::{PlanAnalysis, ROOT_MODULE, short_provider_name};
pub use change::{ChangeKind, ClassifiedChange, classify};
pub use diff::{
    AttributeChange, DisplayValue, SENSITIVE_PLACEHOLDER, UNKNOWN_PLACEHOLDER, attribute_changes,
    redact_sensitive,
};
pub use error::PlanError;
pub use types::{Change, Plan, ResourceChange, ResourceMode};
