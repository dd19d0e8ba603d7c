use thiserror::Error;

/// Core error type shared across fixgen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The config document is structurally invalid.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by fixgen crates.
pub type Result<T> = std::result::Result<T, Error>;
