//! Transaction records conforming to the feature schema

use crate::types::schema::{FeatureSchema, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

/// One transaction row: `Time`, `V1`..`V28`, `Amount`.
///
/// Values are stored in schema order and cannot be changed after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    values: [f64; FEATURE_COUNT],
}

impl TransactionRecord {
    /// Create a record from values in schema order
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Record with every feature set to zero
    pub fn zeroed() -> Self {
        Self::new([0.0; FEATURE_COUNT])
    }

    /// All feature values in schema order
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Look up a feature by column name
    pub fn get(&self, column: &str) -> Option<f64> {
        FeatureSchema::index_of(column).map(|i| self.values[i])
    }

    /// Seconds elapsed since the first transaction in the source dataset
    pub fn time(&self) -> f64 {
        self.values[0]
    }

    /// Transaction amount
    pub fn amount(&self) -> f64 {
        self.values[FEATURE_COUNT - 1]
    }

    /// Features as single precision, the input type ONNX models expect
    pub fn to_f32(&self) -> [f32; FEATURE_COUNT] {
        self.values.map(|v| v as f32)
    }
}

impl From<[f64; FEATURE_COUNT]> for TransactionRecord {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::new(values)
    }
}
