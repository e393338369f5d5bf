use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::detector::{Detector, RemediationOutcome};
use super::report::DriftReport;
use crate::cache::ReportCache;
use crate::config::ConfigError;
use crate::notify::Notifier;
use crate::terraform::{PlanOptions, TerraformRunner};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub auto_remediate: bool,
    pub max_iterations: Option<u32>,
    pub plan: PlanOptions,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            auto_remediate: false,
            max_iterations: None,
            plan: PlanOptions::default(),
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::Interval(
                "polling interval must be greater than zero".to_string(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(ConfigError::Interval(
                "max iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorSummary {
    pub iterations: u32,
    pub drift_events: u32,
    pub remediations: u32,
    pub failures: u32,
}

/// Re-runs drift detection on a fixed interval.
///
/// Notifications fire once per distinct pending change set: an unchanged
/// plan on the next poll is not re-announced, a clean plan (or a successful
/// auto-remediation) resets that. A change set no notifier accepted is
/// announced again on the next poll.
pub struct Monitor<R> {
    detector: Detector<R>,
    config: MonitorConfig,
    notifiers: Vec<Box<dyn Notifier>>,
    cache: Option<ReportCache>,
}

impl<R: TerraformRunner> Monitor<R> {
    pub fn new(detector: Detector<R>, config: MonitorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            detector,
            config,
            notifiers: Vec::new(),
            cache: None,
        })
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn with_cache(mut self, cache: ReportCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn detector(&self) -> &Detector<R> {
        &self.detector
    }

    /// Polls until `max_iterations` is reached or `shutdown` resolves.
    ///
    /// NOTE: shutdown is only observed between polls; an in-flight apply is
    /// never interrupted.
    pub async fn run<F>(&self, shutdown: F) -> MonitorSummary
    where
        F: Future<Output = ()>,
    {
        let mut summary = MonitorSummary::default();
        let mut last_fingerprint = self.cached_fingerprint();

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            auto_remediate = self.config.auto_remediate,
            notifiers = self.notifiers.len(),
            "drift monitor started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, stopping drift monitor");
                    break;
                }
                _ = ticker.tick() => {}
            }

            self.poll_once(&mut last_fingerprint, &mut summary).await;
            summary.iterations += 1;

            if self
                .config
                .max_iterations
                .is_some_and(|max| summary.iterations >= max)
            {
                break;
            }
        }

        tracing::info!(
            iterations = summary.iterations,
            drift_events = summary.drift_events,
            remediations = summary.remediations,
            failures = summary.failures,
            "drift monitor stopped"
        );

        summary
    }

    async fn poll_once(&self, last_fingerprint: &mut Option<String>, summary: &mut MonitorSummary) {
        let detection = match self.detector.detect(&self.config.plan).await {
            Ok(detection) => detection,
            Err(e) => {
                summary.failures += 1;
                tracing::error!(error = %e, "drift detection failed; will retry next interval");
                return;
            }
        };

        let report = &detection.report;

        if !report.has_drift() {
            if last_fingerprint.take().is_some() {
                self.forget_cached_report();
            }
            return;
        }

        let fingerprint = report.fingerprint();
        if last_fingerprint.as_deref() != Some(fingerprint.as_str()) {
            tracing::warn!(
                severity = %report.severity,
                pending = report.summary.pending(),
                "new drift detected"
            );

            // an undelivered report is retried on the next poll
            if self.announce(report).await {
                summary.drift_events += 1;

                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.store(report) {
                        tracing::warn!(error = %e, "failed to cache drift report");
                    }
                }

                *last_fingerprint = Some(fingerprint);
            }
        }

        if !self.config.auto_remediate {
            return;
        }

        match self.detector.remediate(&detection, false).await {
            Ok(RemediationOutcome::Applied { changes }) => {
                summary.remediations += 1;
                *last_fingerprint = None;
                self.forget_cached_report();
                tracing::info!(changes, "drift auto-remediated");
            }
            Ok(RemediationOutcome::Skipped { reason }) => {
                tracing::info!(%reason, "auto-remediation skipped");
            }
            Err(e) => {
                summary.failures += 1;
                tracing::error!(error = %e, "auto-remediation failed");
            }
        }
    }

    /// True when at least one notifier accepted the report, or none are configured.
    async fn announce(&self, report: &DriftReport) -> bool {
        if self.notifiers.is_empty() {
            return true;
        }

        let mut delivered = false;
        for notifier in &self.notifiers {
            match notifier.notify(report).await {
                Ok(()) => delivered = true,
                Err(e) => {
                    tracing::warn!(notifier = notifier.name(), error = %e, "failed to deliver drift notification");
                }
            }
        }
        delivered
    }

    fn forget_cached_report(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.clear(self.detector.runner().working_dir()) {
                tracing::warn!(error = %e, "failed to clear cached drift report");
            }
        }
    }

    fn cached_fingerprint(&self) -> Option<String> {
        let cache = self.cache.as_ref()?;
        let report = cache.load(self.detector.runner().working_dir())?;
        report.has_drift().then(|| report.fingerprint())
    }
}
