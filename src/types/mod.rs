//! Type definitions for the inference gateway

pub mod prediction;
pub mod schema;
pub mod transaction;

pub use prediction::{Label, PredictionResult, Summary};
pub use schema::{FeatureSchema, FEATURE_COLUMNS, FEATURE_COUNT, PREDICTION_COLUMN};
pub use transaction::TransactionRecord;
