use thiserror::Error;

/// SECURITY: Error messages must NEVER contain the webhook URL; it embeds a secret.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid webhook URL")]
    InvalidUrl,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("webhook rejected notification ({status}): {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest includes the request URL in its Display output
        NotifyError::Network(err.without_url())
    }
}
