use thiserror::Error;

use crate::model::GenerationReport;

/// Errors emitted by the fixture engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// A fixture would come out wrong; nothing is written for the class.
    #[error("generation invariant violated: {0}")]
    Invariant(String),
    #[error("core error: {0}")]
    Core(#[from] fixgen_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("generation failed for {} class(es)", .0.errors.len())]
    Failed(GenerationReport),
}
