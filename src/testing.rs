//! Test doubles shared by unit tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::drift::DriftReport;
use crate::notify::{Notifier, NotifyError};
use crate::plan::Plan;
use crate::terraform::{
    ApplyOutcome, PlanOptions, PlannedChanges, StateDocument, TerraformError, TerraformRunner,
};

/// Builds a plan with one managed `null_resource` per action list.
pub(crate) fn plan_with_actions(actions: &[&[&str]]) -> Plan {
    let resource_changes: Vec<serde_json::Value> = actions
        .iter()
        .enumerate()
        .map(|(idx, actions)| {
            serde_json::json!({
                "address": format!("null_resource.r{}", idx),
                "mode": "managed",
                "type": "null_resource",
                "name": format!("r{}", idx),
                "provider_name": "registry.terraform.io/hashicorp/null",
                "change": {"actions": actions, "before": null, "after": {}}
            })
        })
        .collect();

    serde_json::from_value(serde_json::json!({
        "terraform_version": "1.7.5",
        "resource_changes": resource_changes
    }))
    .expect("test plan should deserialize")
}

/// Replays a fixed sequence of plans; the last plan repeats once exhausted.
/// Entries of `None` fail that poll.
pub(crate) struct FakeRunner {
    plans: Vec<Option<Plan>>,
    calls: AtomicUsize,
    applied: Mutex<Vec<PathBuf>>,
}

impl FakeRunner {
    pub(crate) fn new(plans: Vec<Plan>) -> Self {
        Self::with_failures(plans.into_iter().map(Some).collect())
    }

    pub(crate) fn with_failures(plans: Vec<Option<Plan>>) -> Self {
        Self {
            plans,
            calls: AtomicUsize::new(0),
            applied: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self::with_failures(vec![None])
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn applied(&self) -> Vec<PathBuf> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl TerraformRunner for FakeRunner {
    fn working_dir(&self) -> &Path {
        Path::new("/fake/infra")
    }

    async fn plan(&self, _options: &PlanOptions) -> Result<PlannedChanges, TerraformError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let idx = call.min(self.plans.len().saturating_sub(1));

        match self.plans.get(idx).cloned().flatten() {
            Some(plan) => Ok(PlannedChanges {
                has_changes: !plan.resource_changes.is_empty(),
                plan,
                plan_file: PathBuf::from("/fake/infra/tfdrift.tfplan"),
            }),
            None => Err(TerraformError::Command {
                command: "plan".to_string(),
                code: Some(1),
                stderr: "Error: simulated failure".to_string(),
            }),
        }
    }

    async fn apply(&self, plan_file: &Path) -> Result<ApplyOutcome, TerraformError> {
        self.applied.lock().unwrap().push(plan_file.to_path_buf());
        Ok(ApplyOutcome::default())
    }

    async fn show_state(&self) -> Result<StateDocument, TerraformError> {
        Ok(StateDocument::default())
    }
}

/// Records every report it is asked to deliver. The first `fail_first`
/// deliveries are rejected with a 503.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) delivered: std::sync::Arc<Mutex<Vec<DriftReport>>>,
    pub(crate) attempts: std::sync::Arc<AtomicUsize>,
    fail_first: usize,
}

impl RecordingNotifier {
    pub(crate) fn failing_first(fail_first: usize) -> Self {
        Self {
            fail_first,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, report: &DriftReport) -> Result<(), NotifyError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_first {
            return Err(NotifyError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        self.delivered.lock().unwrap().push(report.clone());
        Ok(())
    }
}
