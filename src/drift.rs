//! Drift classification, detection and the polling monitor.

mod detector;
mod monitor;
mod report;

pub use detector::{Detection, Detector, RemediationOutcome};
pub use monitor::{DEFAULT_INTERVAL, Monitor, MonitorConfig, MonitorSummary};
pub use report::{ChangeCounts, ChangeSummary, DriftReport, Severity, safe_to_remediate};
