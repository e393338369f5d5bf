//! Thin wrapper over the external `terraform` binary.
//!
//! All provisioning, locking and graph work stays inside terraform; this
//! module only spawns it and parses the JSON it prints.

mod cli;
mod error;
mod state;

pub use cli::{DEFAULT_BINARY, DEFAULT_PLAN_FILE, TerraformCli};
pub use error::TerraformError;
pub use state::{StateDocument, StateModule, StateOutput, StateResource, StateValues};

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::plan::Plan;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanOptions {
    pub refresh_only: bool,
    pub destroy: bool,
    pub targets: Vec<String>,
    pub var_files: Vec<PathBuf>,
    /// Defaults to [`DEFAULT_PLAN_FILE`] inside the working directory.
    pub plan_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct PlannedChanges {
    pub plan: Plan,
    pub plan_file: PathBuf,
    pub has_changes: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ApplyOutcome {
    pub stdout: String,
}

/// Seam between drift detection and the terraform process, so detection
/// can run against a recorded plan in tests.
#[async_trait]
pub trait TerraformRunner: Send + Sync {
    fn working_dir(&self) -> &Path;
    async fn plan(&self, options: &PlanOptions) -> Result<PlannedChanges, TerraformError>;
    async fn apply(&self, plan_file: &Path) -> Result<ApplyOutcome, TerraformError>;
    async fn show_state(&self) -> Result<StateDocument, TerraformError>;
}
