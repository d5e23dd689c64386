use thiserror::Error;

#[derive(Debug, Error)]
pub enum RotapostError {
    #[error("not initialized: run 'rotapost init'")]
    NotInitialized,

    #[error("destination not found: {0}")]
    DestinationNotFound(String),

    #[error("photo not found: {0}")]
    PhotoNotFound(String),

    #[error("content item '{item}' has no '{segment}' or 'community' text variant")]
    MissingTextVariant { item: String, segment: String },

    #[error("invalid day '{0}': expected a weekday name such as 'monday'")]
    InvalidDay(String),

    #[error("invalid id '{0}': must be lowercase alphanumeric with hyphens or underscores")]
    InvalidId(String),

    #[error("executor failed: {0}")]
    ExecutorFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RotapostError>;
