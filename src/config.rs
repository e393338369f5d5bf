use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::terraform::{DEFAULT_BINARY, TerraformCli};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("working directory '{path}' is not usable: {reason}")]
    WorkingDir { path: String, reason: String },

    #[error("invalid monitor settings: {0}")]
    Interval(String),
}

/// Settings shared by every command, resolved from flags and environment.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub working_dir: PathBuf,
    pub terraform_bin: PathBuf,
    pub color: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            terraform_bin: PathBuf::from(DEFAULT_BINARY),
            color: true,
        }
    }
}

impl RunConfig {
    /// Canonicalizes `working_dir` so plan files and cache keys are stable
    /// regardless of the directory the tool was started from.
    pub fn resolve(mut self) -> Result<Self, ConfigError> {
        self.working_dir = canonical_dir(&self.working_dir)?;
        Ok(self)
    }

    pub fn terraform(&self) -> TerraformCli {
        TerraformCli::new(&self.working_dir)
            .with_binary(&self.terraform_bin)
            .with_color(self.color)
    }
}

fn canonical_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let canonical = path.canonicalize().map_err(|e| ConfigError::WorkingDir {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    if !canonical.is_dir() {
        return Err(ConfigError::WorkingDir {
            path: path.display().to_string(),
            reason: "not a directory".to_string(),
        });
    }

    Ok(canonical)
}
