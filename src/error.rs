use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriftError {
    #[error(transparent)]
    Terraform(#[from] crate::terraform::TerraformError),

    #[error(transparent)]
    Plan(#[from] crate::plan::PlanError),

    #[error("notification error: {0}")]
    Notify(#[from] crate::notify::NotifyError),

    #[error("cache error: {0}")]
    Cache(#[from] crate::cache::CacheError),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("output error: {0}")]
    Output(#[from] crate::output::OutputError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
