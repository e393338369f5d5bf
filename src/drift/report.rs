use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::plan::{ChangeKind, ClassifiedChange, Plan};

/// Ordinal drift severity; derived purely from the change counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_summary(summary: &ChangeSummary) -> Self {
        if summary.delete > 0 || summary.replace > 0 {
            Severity::High
        } else if summary.update > 0 {
            Severity::Medium
        } else if summary.create > 0 {
            Severity::Low
        } else {
            Severity::None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applying is only considered safe when nothing gets destroyed.
pub fn safe_to_remediate(summary: &ChangeSummary) -> bool {
    summary.delete == 0 && summary.replace == 0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub delete: usize,
    pub no_op: usize,
}

/// Per-action counts plus the addresses that fall in each bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub replace: usize,
    pub no_op: usize,
    #[serde(default)]
    pub buckets: BTreeMap<ChangeKind, Vec<String>>,
}

impl ChangeSummary {
    pub fn from_changes<'a>(changes: impl IntoIterator<Item = &'a ClassifiedChange>) -> Self {
        let mut summary = Self::default();
        for change in changes {
            summary.record(change.kind, &change.address);
        }
        summary
    }

    pub fn record(&mut self, kind: ChangeKind, address: &str) {
        *self.count_mut(kind) += 1;
        self.buckets
            .entry(kind)
            .or_default()
            .push(address.to_string());
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        match kind {
            ChangeKind::Create => self.create,
            ChangeKind::Update => self.update,
            ChangeKind::Delete => self.delete,
            ChangeKind::Replace => self.replace,
            ChangeKind::NoOp => self.no_op,
        }
    }

    fn count_mut(&mut self, kind: ChangeKind) -> &mut usize {
        match kind {
            ChangeKind::Create => &mut self.create,
            ChangeKind::Update => &mut self.update,
            ChangeKind::Delete => &mut self.delete,
            ChangeKind::Replace => &mut self.replace,
            ChangeKind::NoOp => &mut self.no_op,
        }
    }

    pub fn addresses(&self, kind: ChangeKind) -> &[String] {
        self.buckets.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.create + self.update + self.delete + self.replace + self.no_op
    }

    /// Changes that would actually touch infrastructure.
    pub fn pending(&self) -> usize {
        self.total() - self.no_op
    }

    pub fn counts(&self) -> ChangeCounts {
        ChangeCounts {
            create: self.create,
            update: self.update,
            replace: self.replace,
            delete: self.delete,
            no_op: self.no_op,
        }
    }
}

impl fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to replace, {} to delete, {} unchanged",
            self.create, self.update, self.replace, self.delete, self.no_op
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub generated_at: DateTime<Utc>,
    pub working_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terraform_version: Option<String>,
    pub summary: ChangeSummary,
    pub severity: Severity,
    pub safe_to_remediate: bool,
    pub changes: Vec<ClassifiedChange>,
    #[serde(default)]
    pub drifted: Vec<String>,
}

impl DriftReport {
    pub fn from_plan(plan: &Plan, working_dir: impl Into<PathBuf>) -> Self {
        let changes: Vec<ClassifiedChange> =
            plan.managed_changes().map(ClassifiedChange::from).collect();
        Self::from_changes(changes, working_dir)
            .with_terraform_version(plan.terraform_version.clone())
            .with_drifted(plan.resource_drift.iter().map(|rc| rc.address.clone()).collect())
    }

    pub fn from_changes(changes: Vec<ClassifiedChange>, working_dir: impl Into<PathBuf>) -> Self {
        let summary = ChangeSummary::from_changes(&changes);
        Self {
            generated_at: Utc::now(),
            working_dir: working_dir.into(),
            terraform_version: None,
            severity: Severity::from_summary(&summary),
            safe_to_remediate: safe_to_remediate(&summary),
            summary,
            changes,
            drifted: Vec::new(),
        }
    }

    fn with_terraform_version(mut self, version: Option<String>) -> Self {
        self.terraform_version = version;
        self
    }

    fn with_drifted(mut self, drifted: Vec<String>) -> Self {
        self.drifted = drifted;
        self
    }

    pub fn has_drift(&self) -> bool {
        self.severity > Severity::None
    }

    pub fn changes_of(&self, kind: ChangeKind) -> impl Iterator<Item = &ClassifiedChange> {
        self.changes.iter().filter(move |c| c.kind == kind)
    }

    /// Hex SHA-256 over the sorted pending `(kind, address)` pairs.
    ///
    /// Independent of `generated_at`, so repeated polls of an unchanged
    /// plan produce the same value.
    pub fn fingerprint(&self) -> String {
        let mut entries: Vec<(ChangeKind, &str)> = self
            .changes
            .iter()
            .filter(|c| c.kind != ChangeKind::NoOp)
            .map(|c| (c.kind, c.address.as_str()))
            .collect();
        entries.sort();

        let mut hasher = Sha256::new();
        for (kind, address) in entries {
            hasher.update(kind.label().as_bytes());
            hasher.update(b" ");
            hasher.update(address.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}
