//! Fraud Detection Gateway Library
//!
//! Validates transaction batches against a fixed 30-column schema and labels
//! them with a pre-trained binary classifier.

pub mod batch;
pub mod config;
pub mod error;
pub mod gateway;
pub mod manual;
pub mod models;
pub mod report;
pub mod types;

pub use config::AppConfig;
pub use error::{ClassifierError, GatewayError};
pub use gateway::InferenceGateway;
pub use models::{Classifier, ModelLoader};
pub use types::{
    FeatureSchema, Label, PredictionResult, Summary, TransactionRecord, FEATURE_COLUMNS,
};
