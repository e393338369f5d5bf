//! Drift notifications.

mod error;
mod webhook;

pub use error::NotifyError;
pub use webhook::{WebhookNotifier, WebhookPayload};

use async_trait::async_trait;

use crate::drift::DriftReport;

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    async fn notify(&self, report: &DriftReport) -> Result<(), NotifyError>;
}
