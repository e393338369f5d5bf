use std::path::PathBuf;

use super::report::DriftReport;
use crate::error::DriftError;
use crate::terraform::{PlanOptions, TerraformRunner};

/// A drift report together with the saved plan it was computed from.
#[derive(Debug, Clone)]
pub struct Detection {
    pub report: DriftReport,
    pub plan_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemediationOutcome {
    Applied { changes: usize },
    Skipped { reason: String },
}

pub struct Detector<R> {
    runner: R,
}

impl<R: TerraformRunner> Detector<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub async fn detect(&self, options: &PlanOptions) -> Result<Detection, DriftError> {
        let planned = self.runner.plan(options).await?;

        if planned.plan.errored {
            tracing::warn!("terraform reported an errored plan; report may be incomplete");
        }

        let report = DriftReport::from_plan(&planned.plan, self.runner.working_dir());

        tracing::info!(
            working_dir = %report.working_dir.display(),
            create = report.summary.create,
            update = report.summary.update,
            replace = report.summary.replace,
            delete = report.summary.delete,
            drifted = report.drifted.len(),
            severity = %report.severity,
            "drift detection complete"
        );

        Ok(Detection {
            report,
            plan_file: planned.plan_file,
        })
    }

    /// Applies the saved plan when it destroys nothing, or when `force` is set.
    pub async fn remediate(
        &self,
        detection: &Detection,
        force: bool,
    ) -> Result<RemediationOutcome, DriftError> {
        let report = &detection.report;

        if !report.has_drift() {
            return Ok(RemediationOutcome::Skipped {
                reason: "no changes".to_string(),
            });
        }

        if !report.safe_to_remediate && !force {
            let destructive: Vec<&str> = report
                .changes
                .iter()
                .filter(|c| c.kind.is_destructive())
                .map(|c| c.address.as_str())
                .collect();
            tracing::warn!(
                delete = report.summary.delete,
                replace = report.summary.replace,
                addresses = ?destructive,
                "refusing to apply plan with destructive changes"
            );
            return Ok(RemediationOutcome::Skipped {
                reason: format!(
                    "plan destroys resources ({} to delete, {} to replace)",
                    report.summary.delete, report.summary.replace
                ),
            });
        }

        self.runner.apply(&detection.plan_file).await?;

        let changes = report.summary.pending();
        tracing::info!(changes, "remediation applied");
        Ok(RemediationOutcome::Applied { changes })
    }
}
