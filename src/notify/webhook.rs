use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;

use super::{Notifier, NotifyError};
use crate::drift::{ChangeCounts, DriftReport, Severity};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ERROR_BODY: usize = 512;

/// Body posted to the webhook. `text` makes it usable as-is by chat
/// incoming-webhooks; the remaining fields are for machine consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub text: String,
    pub severity: Severity,
    pub safe_to_remediate: bool,
    pub working_dir: String,
    pub summary: ChangeCounts,
    pub fingerprint: String,
    pub generated_at: String,
}

impl WebhookPayload {
    pub fn from_report(report: &DriftReport) -> Self {
        Self {
            text: format!(
                "Terraform drift detected in {} (severity: {}): {}",
                report.working_dir.display(),
                report.severity,
                report.summary
            ),
            severity: report.severity,
            safe_to_remediate: report.safe_to_remediate,
            working_dir: report.working_dir.display().to_string(),
            summary: report.summary.counts(),
            fingerprint: report.fingerprint(),
            generated_at: report.generated_at.to_rfc3339(),
        }
    }
}

#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self, NotifyError> {
        let url = reqwest::Url::parse(url).map_err(|_| NotifyError::InvalidUrl)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NotifyError::InvalidUrl);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("tfdrift/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn notify(&self, report: &DriftReport) -> Result<(), NotifyError> {
        let payload = WebhookPayload::from_report(report);

        let response = self.client.post(self.url.clone()).json(&payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY)
                .collect();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(severity = %report.severity, "drift notification delivered");
        Ok(())
    }
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::plan_with_actions;

    #[test]
    fn test_rejects_invalid_urls() {
        assert!(matches!(
            WebhookNotifier::new("not a url"),
            Err(NotifyError::InvalidUrl)
        ));
        assert!(matches!(
            WebhookNotifier::new("ftp://hooks.example.com/x"),
            Err(NotifyError::InvalidUrl)
        ));
    }

    #[test]
    fn test_debug_does_not_expose_url() {
        let notifier =
            WebhookNotifier::new("https://hooks.example.com/services/T000/B000/secret123").unwrap();
        let debug_output = format!("{:?}", notifier);

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("secret123"));
    }

    #[test]
    fn test_payload_from_report() {
        let report =
            DriftReport::from_plan(&plan_with_actions(&[&["update"], &["delete"]]), "/infra/prod");
        let payload = WebhookPayload::from_report(&report);

        assert_eq!(payload.severity, Severity::High);
        assert!(!payload.safe_to_remediate);
        assert_eq!(payload.summary.update, 1);
        assert_eq!(payload.summary.delete, 1);
        assert!(payload.text.contains("/infra/prod"));
        assert!(payload.text.contains("severity: high"));
        assert_eq!(payload.fingerprint, report.fingerprint());
    }
}
