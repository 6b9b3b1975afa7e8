//! Error types for the inference gateway

use thiserror::Error;

/// Errors surfaced to callers of the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Column names do not match the feature schema exactly
    #[error(
        "column mismatch: expected {} columns [{}], got {} [{}]",
        .expected.len(),
        .expected.join(", "),
        .actual.len(),
        .actual.join(", ")
    )]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// The classifier could not produce labels for the batch
    #[error("inference failed: {0}")]
    InferenceFailure(#[from] ClassifierError),

    /// The uploaded batch could not be parsed as CSV
    #[error("failed to read batch: {0}")]
    Read(#[from] csv::Error),

    /// The batch or result file could not be opened, read or written
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Build a schema mismatch against the fixed feature schema.
    pub fn schema_mismatch<S: AsRef<str>>(actual: &[S]) -> Self {
        GatewayError::SchemaMismatch {
            expected: crate::types::schema::FEATURE_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            actual: actual.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, GatewayError::SchemaMismatch { .. })
    }
}

/// Failures raised while running a classifier over a batch.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("empty batch: at least one transaction is required")]
    EmptyBatch,

    #[error("row {row}: column {column} is not numeric ({value:?})")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: column {column} is not a finite number")]
    NonFinite { row: usize, column: String },

    #[error("classifier returned {actual} labels for {expected} records")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("classifier returned label {label} for row {row}, expected 0 or 1")]
    InvalidLabel { row: usize, label: i64 },

    #[error("model produced no usable output: {0}")]
    MissingOutput(String),

    #[error("model session unavailable: {0}")]
    Session(String),

    #[error("onnx runtime error: {0}")]
    Runtime(String),
}
