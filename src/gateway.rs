//! Inference gateway: schema validation, batch prediction and summaries

use crate::error::{ClassifierError, GatewayError};
use crate::models::classifier::Classifier;
use crate::types::prediction::{Label, PredictionResult, Summary};
use crate::types::schema::FeatureSchema;
use crate::types::transaction::TransactionRecord;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Validates records against the feature schema and labels them with a
/// shared classifier.
///
/// Every call is independent: a failed prediction leaves the classifier
/// untouched and never yields partial results.
#[derive(Clone)]
pub struct InferenceGateway {
    classifier: Arc<dyn Classifier>,
}

impl InferenceGateway {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Name of the underlying classifier
    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Check an uploaded header against the schema
    pub fn validate<S: AsRef<str>>(&self, columns: &[S]) -> Result<(), GatewayError> {
        let result = FeatureSchema::validate(columns);
        if result.is_err() {
            warn!(columns = columns.len(), "Rejected batch with mismatched columns");
        }
        result
    }

    /// Label a batch of records with a single classifier call.
    ///
    /// `result[i]` always corresponds to `records[i]`.
    pub fn predict(
        &self,
        records: Vec<TransactionRecord>,
    ) -> Result<Vec<PredictionResult>, GatewayError> {
        let batch_id = Uuid::new_v4();

        if records.is_empty() {
            warn!(batch_id = %batch_id, "Rejected empty batch");
            return Err(ClassifierError::EmptyBatch.into());
        }

        let start_time = Instant::now();
        let raw = self.classifier.predict(&records).map_err(|e| {
            error!(
                batch_id = %batch_id,
                model = %self.classifier.name(),
                error = %e,
                "Inference failed"
            );
            GatewayError::InferenceFailure(e)
        })?;

        if raw.len() != records.len() {
            return Err(ClassifierError::LengthMismatch {
                expected: records.len(),
                actual: raw.len(),
            }
            .into());
        }

        let labels = raw
            .iter()
            .enumerate()
            .map(|(row, &code)| {
                Label::from_code(code).ok_or(ClassifierError::InvalidLabel {
                    row: row + 1,
                    label: code,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let results: Vec<PredictionResult> = records
            .into_iter()
            .zip(labels)
            .map(|(record, label)| PredictionResult::new(record, label))
            .collect();

        let fraud = results.iter().filter(|r| r.label().is_fraud()).count();
        info!(
            batch_id = %batch_id,
            model = %self.classifier.name(),
            records = results.len(),
            fraud = fraud,
            processing_time_us = start_time.elapsed().as_micros(),
            "Batch labeled"
        );

        Ok(results)
    }

    /// Label a single manually entered record
    pub fn predict_one(&self, record: TransactionRecord) -> Result<PredictionResult, GatewayError> {
        let result = self
            .predict(vec![record])?
            .pop()
            .ok_or(ClassifierError::LengthMismatch {
                expected: 1,
                actual: 0,
            })?;
        debug!(label = %result.label(), "Single record labeled");
        Ok(result)
    }

    /// Count genuine and fraudulent results
    pub fn summarize(results: &[PredictionResult]) -> Summary {
        Summary::from_results(results)
    }
}
