use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::process::Command;

use super::state::StateDocument;
use super::{ApplyOutcome, PlanOptions, PlannedChanges, TerraformError, TerraformRunner};
use crate::plan::Plan;

pub const DEFAULT_BINARY: &str = "terraform";
pub const DEFAULT_PLAN_FILE: &str = "tfdrift.tfplan";

// `plan -detailed-exitcode`: 0 = no changes, 2 = changes present
const PLAN_EXIT_CODES: &[i32] = &[0, 2];

#[derive(Debug, Clone)]
pub struct TerraformCli {
    binary: PathBuf,
    working_dir: PathBuf,
    no_color: bool,
    env: Vec<(String, String)>,
}

struct CommandOutput {
    code: Option<i32>,
    stdout: String,
}

impl TerraformCli {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            working_dir: working_dir.into(),
            no_color: true,
            env: Vec::new(),
        }
    }

    /// NOTE: Primarily used to point at a wrapper script (or a fake binary in tests).
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.no_color = !color;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub async fn version(&self) -> Result<String, TerraformError> {
        let output = self.run(&["version", "-json"], &[0]).await?;
        let body: serde_json::Value = parse_json("version", &output.stdout)?;
        Ok(body
            .get("terraform_version")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string())
    }

    pub async fn init(&self) -> Result<(), TerraformError> {
        let mut args = vec!["init", "-input=false"];
        if self.no_color {
            args.push("-no-color");
        }
        self.run(&args, &[0]).await?;
        tracing::info!(working_dir = %self.working_dir.display(), "terraform init complete");
        Ok(())
    }

    pub async fn show_plan(&self, plan_file: &Path) -> Result<Plan, TerraformError> {
        let plan_arg = plan_file.display().to_string();
        let output = self
            .run(&["show", "-json", "-no-color", &plan_arg], &[0])
            .await?;
        Ok(Plan::from_json(&output.stdout)?)
    }

    pub async fn state_list(&self) -> Result<Vec<String>, TerraformError> {
        let output = self.run(&["state", "list"], &[0]).await?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub async fn outputs(&self) -> Result<serde_json::Value, TerraformError> {
        let output = self.run(&["output", "-json", "-no-color"], &[0]).await?;
        parse_json("output", &output.stdout)
    }

    fn plan_args(&self, options: &PlanOptions, plan_file: &Path) -> Vec<String> {
        let mut args = vec![
            "plan".to_string(),
            "-input=false".to_string(),
            "-detailed-exitcode".to_string(),
            format!("-out={}", plan_file.display()),
        ];
        if self.no_color {
            args.push("-no-color".to_string());
        }
        if options.refresh_only {
            args.push("-refresh-only".to_string());
        }
        if options.destroy {
            args.push("-destroy".to_string());
        }
        for target in &options.targets {
            args.push(format!("-target={}", target));
        }
        for var_file in &options.var_files {
            args.push(format!("-var-file={}", var_file.display()));
        }
        args
    }

    async fn run<S: AsRef<str>>(
        &self,
        args: &[S],
        allowed_codes: &[i32],
    ) -> Result<CommandOutput, TerraformError> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        let subcommand = args.first().copied().unwrap_or_default().to_string();

        tracing::debug!(binary = %self.binary.display(), ?args, "running terraform");

        let output = Command::new(&self.binary)
            .args(&args)
            .current_dir(&self.working_dir)
            .env("TF_IN_AUTOMATION", "1")
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let code = output.status.code();
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !code.is_some_and(|c| allowed_codes.contains(&c)) {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(command = %subcommand, ?code, "terraform command failed");
            return Err(TerraformError::Command {
                command: subcommand,
                code,
                stderr,
            });
        }

        Ok(CommandOutput { code, stdout })
    }

    // spawn reports a missing current_dir as NotFound too
    fn spawn_error(&self, err: std::io::Error) -> TerraformError {
        if err.kind() != std::io::ErrorKind::NotFound {
            return TerraformError::Spawn(err);
        }
        if !self.working_dir.is_dir() {
            return TerraformError::WorkingDir {
                path: self.working_dir.display().to_string(),
            };
        }
        TerraformError::NotFound {
            binary: self.binary.display().to_string(),
        }
    }
}

#[async_trait]
impl TerraformRunner for TerraformCli {
    fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    async fn plan(&self, options: &PlanOptions) -> Result<PlannedChanges, TerraformError> {
        // relative plan files resolve against the working directory, like terraform does
        let plan_file = self.working_dir.join(
            options
                .plan_file
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_PLAN_FILE)),
        );

        let args = self.plan_args(options, &plan_file);
        let output = self.run(&args, PLAN_EXIT_CODES).await?;
        let has_changes = output.code == Some(2);

        tracing::info!(has_changes, plan_file = %plan_file.display(), "terraform plan complete");

        let plan = self.show_plan(&plan_file).await?;

        Ok(PlannedChanges {
            plan,
            plan_file,
            has_changes,
        })
    }

    async fn apply(&self, plan_file: &Path) -> Result<ApplyOutcome, TerraformError> {
        let plan_arg = plan_file.display().to_string();
        let mut args = vec!["apply", "-input=false"];
        if self.no_color {
            args.push("-no-color");
        }
        args.push(&plan_arg);

        let output = self.run(&args, &[0]).await?;
        tracing::info!(plan_file = %plan_file.display(), "terraform apply complete");

        Ok(ApplyOutcome {
            stdout: output.stdout,
        })
    }

    async fn show_state(&self) -> Result<StateDocument, TerraformError> {
        let output = self.run(&["show", "-json", "-no-color"], &[0]).await?;
        parse_json("show", &output.stdout)
    }
}

fn parse_json<T: DeserializeOwned>(command: &str, stdout: &str) -> Result<T, TerraformError> {
    serde_json::from_str(stdout).map_err(|source| TerraformError::Parse {
        command: command.to_string(),
        source,
    })
}
