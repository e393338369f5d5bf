use std::borrow::Borrow;

use thiserror::Error;

use crate::plan::PlanError;

/// Failures talking to the external `terraform` binary.
///
/// NOTE: stderr is carried verbatim; terraform already redacts sensitive values.
#[derive(Debug, Error)]
pub enum TerraformError {
    #[error("terraform binary not found: '{binary}'")]
    NotFound { binary: String },

    #[error("terraform working directory '{path}' does not exist")]
    WorkingDir { path: String },

    #[error("failed to run terraform: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("`terraform {command}` failed (exit code {exit}): {stderr}", exit = display_code(.code))]
    Command {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("unexpected output from `terraform {command}`: {source}")]
    Parse {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Plan(#[from] PlanError),
}

fn display_code(code: impl Borrow<Option<i32>>) -> String {
    code.borrow().map_or_else(|| "signal".to_string(), |c| c.to_string())
}
