use std::io::{IsTerminal, Read};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use color_eyre::eyre::{Result, bail};

use tfdrift::cache::ReportCache;
use tfdrift::config::RunConfig;
use tfdrift::drift::{Detector, DriftReport, Monitor, MonitorConfig, RemediationOutcome};
use tfdrift::notify::WebhookNotifier;
use tfdrift::output::{self, OutputFormat};
use tfdrift::plan::{Plan, PlanAnalysis};
use tfdrift::terraform::TerraformRunner;

use super::args::{
    AnalyzeArgs, ApplyArgs, CheckArgs, Cli, Command, DriftCommand, MonitorArgs, PlanCommandArgs,
    StateCommand,
};

const DRIFT_EXIT_CODE: u8 = 2;

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let color = !cli.color_disabled() && std::io::stdout().is_terminal();
    let config = RunConfig {
        working_dir: cli.dir,
        terraform_bin: cli.terraform_bin,
        color,
        ..Default::default()
    }
    .resolve()?;

    tracing::debug!(
        working_dir = %config.working_dir.display(),
        terraform = %config.terraform_bin.display(),
        "configuration resolved"
    );

    match cli.command {
        Command::Init => {
            config.terraform().init().await?;
            println!("Terraform initialized in {}", config.working_dir.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Plan(args) => plan(&config, args).await,
        Command::Analyze(args) => analyze(&config, args),
        Command::Apply(args) => apply(&config, args).await,
        Command::Drift { command } => match command {
            DriftCommand::Check(args) => check(&config, args).await,
            DriftCommand::Monitor(args) => monitor(&config, args).await,
        },
        Command::State { command } => match command {
            StateCommand::List => {
                for address in config.terraform().state_list().await? {
                    println!("{}", address);
                }
                Ok(ExitCode::SUCCESS)
            }
            StateCommand::Show { address } => {
                let state = config.terraform().show_state().await?;
                let Some(resource) = state.find(&address) else {
                    bail!("resource '{}' not found in state", address);
                };
                println!("{}", serde_json::to_string_pretty(&resource.redacted())?);
                Ok(ExitCode::SUCCESS)
            }
        },
        Command::Output => {
            let outputs = config.terraform().outputs().await?;
            println!("{}", serde_json::to_string_pretty(&outputs)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn plan(config: &RunConfig, args: PlanCommandArgs) -> Result<ExitCode> {
    let detector = Detector::new(config.terraform());
    let detection = detector.detect(&args.plan.to_options(args.destroy)).await?;

    print!("{}", output::render(&detection.report, args.format, config.color)?);
    Ok(ExitCode::SUCCESS)
}

fn analyze(config: &RunConfig, args: AnalyzeArgs) -> Result<ExitCode> {
    let plan = if args.file == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Plan::from_json(&raw)?
    } else {
        Plan::from_path(&args.file)?
    };

    let report = DriftReport::from_plan(&plan, &config.working_dir);
    let analysis = PlanAnalysis::from_plan(&plan);

    match args.format {
        OutputFormat::Json => {
            let combined = serde_json::json!({
                "report": report,
                "analysis": analysis,
            });
            println!("{}", serde_json::to_string_pretty(&combined)?);
        }
        OutputFormat::Text | OutputFormat::Table => {
            print!("{}", output::render(&report, args.format, config.color)?);
            let breakdown = output::render_breakdown(&analysis);
            if !breakdown.is_empty() {
                println!();
                print!("{}", breakdown);
            }
        }
        OutputFormat::Tree => {
            print!("{}", output::render(&report, args.format, config.color)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn apply(config: &RunConfig, args: ApplyArgs) -> Result<ExitCode> {
    let detector = Detector::new(config.terraform());
    let detection = detector.detect(&args.plan.to_options(false)).await?;
    let report = &detection.report;

    print!("{}", output::render(report, OutputFormat::Text, config.color)?);

    if !report.has_drift() {
        println!("Nothing to apply.");
        return Ok(ExitCode::SUCCESS);
    }

    if !report.safe_to_remediate && !args.force {
        bail!(
            "plan deletes or replaces resources ({} to delete, {} to replace); re-run with --force to apply anyway",
            report.summary.delete,
            report.summary.replace
        );
    }

    if !args.auto_approve {
        println!("Re-run with --auto-approve to apply these changes.");
        return Ok(ExitCode::SUCCESS);
    }

    match detector.remediate(&detection, args.force).await? {
        RemediationOutcome::Applied { changes } => println!("Applied {} change(s).", changes),
        RemediationOutcome::Skipped { reason } => println!("Apply skipped: {}", reason),
    }
    Ok(ExitCode::SUCCESS)
}

async fn check(config: &RunConfig, args: CheckArgs) -> Result<ExitCode> {
    let detector = Detector::new(config.terraform());
    let detection = detector.detect(&args.plan.to_options(false)).await?;

    print!("{}", output::render(&detection.report, args.format, config.color)?);

    if args.exit_code && detection.report.has_drift() {
        return Ok(ExitCode::from(DRIFT_EXIT_CODE));
    }
    Ok(ExitCode::SUCCESS)
}

async fn monitor(config: &RunConfig, args: MonitorArgs) -> Result<ExitCode> {
    let monitor_config = MonitorConfig {
        interval: Duration::from_secs(args.interval),
        auto_remediate: args.auto_remediate,
        max_iterations: args.max_runs,
        plan: args.plan.to_options(false),
    };

    let mut monitor = Monitor::new(Detector::new(config.terraform()), monitor_config)?;

    if let Some(url) = &args.webhook_url {
        monitor = monitor.with_notifier(Box::new(WebhookNotifier::new(url)?));
    }

    if !args.no_cache {
        let cache = match args.cache_dir {
            Some(dir) => Some(ReportCache::new(dir)),
            None => match ReportCache::default_location() {
                Ok(cache) => Some(cache),
                Err(e) => {
                    tracing::warn!(error = %e, "report cache disabled");
                    None
                }
            },
        };
        if let Some(cache) = cache {
            monitor = monitor.with_cache(cache);
        }
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    let summary = monitor.run(shutdown).await;
    println!(
        "Monitor stopped after {} poll(s): {} drift event(s), {} remediation(s), {} failure(s).",
        summary.iterations, summary.drift_events, summary.remediations, summary.failures
    );
    Ok(ExitCode::SUCCESS)
}
