use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a model or serving a prediction.
///
/// Every variant is terminal for the current request; nothing is retried.
#[derive(Debug, Error)]
pub enum LoanError {
    #[error("Model artifact not found at {path:?}: {source}. Run `train_model` first")]
    ArtifactNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model artifact at {path:?} is unusable: {reason}")]
    ArtifactCorrupt { path: PathBuf, reason: String },

    #[error("Schema mismatch: missing fields {missing:?}, unexpected fields {unexpected:?}")]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
}

impl LoanError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that abort the training pipeline before an artifact is written.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Cannot read dataset {path:?}: {source}")]
    DatasetUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{column}' not found in dataset header")]
    MissingColumn { column: String },

    #[error("Column '{column}' is not an applicant feature")]
    UnexpectedColumn { column: String },

    #[error("Column '{column}' appears more than once in dataset header")]
    DuplicateColumn { column: String },

    #[error("Line {line}: column '{column}' has non-numeric value '{value}'")]
    MalformedValue {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Line {line}: column '{column}' has unmappable category '{value}'")]
    UnmappableCategory {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Dataset has {rows} rows, need at least {required} to split and fit")]
    InsufficientRows { rows: usize, required: usize },

    #[error("Invalid training parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Failed to write model artifact to {path:?}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize model artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}
