//! Error handling

use std::path::PathBuf;

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    // Artifact errors (fatal at startup)
    #[error("model artifact not found at {path}")]
    ArtifactMissing { path: PathBuf },

    #[error("failed to read model artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}: {source}")]
    ArtifactFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported artifact format version {found} (expected {expected})")]
    ArtifactVersion { found: u32, expected: u32 },

    // Inference errors
    #[error("inference failed: {0}")]
    Inference(String),

    // Batch input errors
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize CSV: {0}")]
    CsvWrite(String),

    #[error("CSV input has no header row")]
    EmptyCsv,

    #[error("line {line}: column '{column}' has non-numeric value '{value}'")]
    NumericValue {
        line: usize,
        column: String,
        value: String,
    },

    // Record construction errors
    #[error("field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}
