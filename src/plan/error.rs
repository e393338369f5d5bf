use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read plan file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid plan JSON: {0}")]
    Parse(#[source] serde_json::Error),
}
