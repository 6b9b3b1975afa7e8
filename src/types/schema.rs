//! Fixed feature schema shared by uploads, manual entry and the models

use crate::error::GatewayError;

/// Number of numeric features in every transaction record.
pub const FEATURE_COUNT: usize = 30;

/// Feature columns in the exact order the model was trained on.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "Time", "V1", "V2", "V3", "V4", "V5", "V6", "V7", "V8", "V9", "V10", "V11", "V12", "V13",
    "V14", "V15", "V16", "V17", "V18", "V19", "V20", "V21", "V22", "V23", "V24", "V25", "V26",
    "V27", "V28", "Amount",
];

/// Column appended to results.
pub const PREDICTION_COLUMN: &str = "Prediction";

/// The ordered, immutable feature schema.
pub struct FeatureSchema;

impl FeatureSchema {
    /// Expected column names, in order.
    pub fn columns() -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }

    /// Position of a column in the schema.
    pub fn index_of(name: &str) -> Option<usize> {
        FEATURE_COLUMNS.iter().position(|c| *c == name)
    }

    /// Check that `columns` matches the schema element for element.
    ///
    /// Comparison is exact: no trimming, no case folding, no reordering and
    /// no subset matching.
    pub fn validate<S: AsRef<str>>(columns: &[S]) -> Result<(), GatewayError> {
        let matches = columns.len() == FEATURE_COUNT
            && columns
                .iter()
                .zip(FEATURE_COLUMNS.iter())
                .all(|(actual, expected)| actual.as_ref() == *expected);

        if matches {
            Ok(())
        } else {
            Err(GatewayError::schema_mismatch(columns))
        }
    }

    /// Human-readable description used in mismatch messages.
    pub fn describe() -> String {
        format!(
            "{} columns: {}, {}–{}, {}",
            FEATURE_COUNT,
            FEATURE_COLUMNS[0],
            FEATURE_COLUMNS[1],
            FEATURE_COLUMNS[FEATURE_COUNT - 2],
            FEATURE_COLUMNS[FEATURE_COUNT - 1]
        )
    }
}
