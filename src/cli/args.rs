use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tfdrift::output::OutputFormat;
use tfdrift::terraform::PlanOptions;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Terraform working directory
    #[arg(long, short = 'C', global = true, env = "TFDRIFT_DIR", default_value = ".")]
    pub dir: PathBuf,

    #[arg(long, global = true, env = "TFDRIFT_TERRAFORM_BIN", default_value = "terraform")]
    pub terraform_bin: PathBuf,

    /// Disable colored output (also disabled by any non-empty NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// NO_COLOR disables color for any non-empty value, including "0" and "false".
    pub fn color_disabled(&self) -> bool {
        self.no_color || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty())
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run `terraform init`
    Init,
    /// Plan and report pending changes
    Plan(PlanCommandArgs),
    /// Analyze an existing `terraform show -json` plan file ("-" for stdin)
    Analyze(AnalyzeArgs),
    /// Plan, then apply when the plan is safe (or forced)
    Apply(ApplyArgs),
    Drift {
        #[command(subcommand)]
        command: DriftCommand,
    },
    State {
        #[command(subcommand)]
        command: StateCommand,
    },
    /// Print `terraform output -json`
    Output,
}

#[derive(Subcommand, Debug)]
pub enum DriftCommand {
    /// Detect drift once
    Check(CheckArgs),
    /// Poll for drift on an interval
    Monitor(MonitorArgs),
}

#[derive(Subcommand, Debug)]
pub enum StateCommand {
    List,
    Show { address: String },
}

#[derive(clap::Args, Debug, Default)]
pub struct PlanArgs {
    #[arg(long = "target")]
    pub targets: Vec<String>,

    #[arg(long = "var-file")]
    pub var_files: Vec<PathBuf>,

    #[arg(long)]
    pub refresh_only: bool,

    /// Plan file to write, relative to the working directory
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl PlanArgs {
    pub fn to_options(&self, destroy: bool) -> PlanOptions {
        PlanOptions {
            refresh_only: self.refresh_only,
            destroy,
            targets: self.targets.clone(),
            var_files: self.var_files.clone(),
            plan_file: self.out.clone(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct PlanCommandArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    #[arg(long)]
    pub destroy: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    pub file: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Apply without asking for confirmation
    #[arg(long)]
    pub auto_approve: bool,

    /// Apply even when the plan deletes or replaces resources
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Exit with status 2 when drift is found
    #[arg(long)]
    pub exit_code: bool,
}

#[derive(clap::Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Seconds between polls
    #[arg(long, default_value_t = 300)]
    pub interval: u64,

    /// Apply automatically when the plan destroys nothing
    #[arg(long)]
    pub auto_remediate: bool,

    #[arg(long)]
    pub max_runs: Option<u32>,

    #[arg(long, env = "TFDRIFT_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,

    #[arg(long, env = "TFDRIFT_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    #[arg(long)]
    pub no_cache: bool,
}
