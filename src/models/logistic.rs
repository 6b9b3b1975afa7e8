//! Logistic regression classifier stored as JSON
//!
//! Portable stand-in for a pickled scikit-learn `StandardScaler` +
//! `LogisticRegression` pipeline: the coefficients are exported once and
//! evaluated here without any runtime dependency.

use crate::error::ClassifierError;
use crate::models::classifier::Classifier;
use crate::types::schema::{FEATURE_COLUMNS, FEATURE_COUNT};
use crate::types::transaction::TransactionRecord;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Serialized logistic model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Model name
    #[serde(default = "default_name")]
    pub name: String,
    /// One coefficient per feature, in schema order
    pub weights: Vec<f64>,
    /// Bias term
    pub intercept: f64,
    /// Optional standardization applied before the linear term
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    /// Decision threshold on the fraud probability
    #[serde(default)]
    pub threshold: Option<f64>,
}

fn default_name() -> String {
    "logistic".to_string()
}

/// Per-feature `(x - mean) / scale`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Evaluates a [`LogisticModel`] over transaction batches
#[derive(Debug)]
pub struct LogisticClassifier {
    name: String,
    weights: [f64; FEATURE_COUNT],
    intercept: f64,
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
    threshold: f64,
}

impl LogisticClassifier {
    /// Build a classifier, using `default_threshold` when the model has none
    pub fn new(model: LogisticModel, default_threshold: f64) -> Result<Self> {
        let weights = to_features(&model.weights, "weights")?;

        let (mean, scale) = match &model.scaler {
            Some(scaler) => {
                let mean = to_features(&scaler.mean, "scaler.mean")?;
                let scale = to_features(&scaler.scale, "scaler.scale")?;
                if let Some(i) = scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
                    bail!(
                        "scaler.scale for {} must be a non-zero finite number",
                        FEATURE_COLUMNS[i]
                    );
                }
                (mean, scale)
            }
            None => ([0.0; FEATURE_COUNT], [1.0; FEATURE_COUNT]),
        };

        let threshold = model.threshold.unwrap_or(default_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            bail!("threshold must be within [0, 1], got {}", threshold);
        }

        Ok(Self {
            name: model.name,
            weights,
            intercept: model.intercept,
            mean,
            scale,
            threshold,
        })
    }

    /// Load a model from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P, default_threshold: f64) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model from {:?}", path))?;
        let model: LogisticModel = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse logistic model {:?}", path))?;

        let classifier = Self::new(model, default_threshold)?;
        info!(
            model = %classifier.name,
            path = %path.display(),
            threshold = classifier.threshold,
            "Logistic model loaded"
        );
        Ok(classifier)
    }

    /// Fraud probability for one record
    pub fn probability(&self, record: &TransactionRecord) -> f64 {
        let z = record
            .values()
            .iter()
            .enumerate()
            .fold(self.intercept, |acc, (i, x)| {
                acc + self.weights[i] * (x - self.mean[i]) / self.scale[i]
            });
        1.0 / (1.0 + (-z).exp())
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

fn to_features(values: &[f64], field: &str) -> Result<[f64; FEATURE_COUNT]> {
    values.try_into().map_err(|_| {
        anyhow::anyhow!(
            "{} must have {} entries, got {}",
            field,
            FEATURE_COUNT,
            values.len()
        )
    })
}

impl Classifier for LogisticClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, records: &[TransactionRecord]) -> Result<Vec<i64>, ClassifierError> {
        records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                if let Some(i) = record.values().iter().position(|v| !v.is_finite()) {
                    return Err(ClassifierError::NonFinite {
                        row: row + 1,
                        column: FEATURE_COLUMNS[i].to_string(),
                    });
                }
                Ok(i64::from(self.probability(record) >= self.threshold))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Fraud when Amount is large: weight only on the last feature.
    fn amount_model() -> LogisticModel {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[FEATURE_COUNT - 1] = 1.0;
        LogisticModel {
            name: "amount".to_string(),
            weights,
            intercept: -100.0,
            scaler: None,
            threshold: None,
        }
    }

    fn record_with_amount(amount: f64) -> TransactionRecord {
        let mut values = [0.0; FEATURE_COUNT];
        values[FEATURE_COUNT - 1] = amount;
        TransactionRecord::new(values)
    }

    #[test]
    fn test_probability_and_labels() {
        let classifier = LogisticClassifier::new(amount_model(), 0.5).unwrap();

        assert!((classifier.probability(&record_with_amount(100.0)) - 0.5).abs() < 1e-12);
        assert!(classifier.probability(&record_with_amount(0.0)) < 0.01);

        let labels = classifier
            .predict(&[
                record_with_amount(10.0),
                record_with_amount(500.0),
                record_with_amount(99.0),
            ])
            .unwrap();
        assert_eq!(labels, vec![0, 1, 0]);
    }

    #[test]
    fn test_all_zero_record() {
        let classifier = LogisticClassifier::new(amount_model(), 0.5).unwrap();
        let labels = classifier.predict(&[TransactionRecord::zeroed()]).unwrap();
        assert_eq!(labels, vec![0]);
    }

    #[test]
    fn test_scaler_applied() {
        let mut model = amount_model();
        model.intercept = 0.0;
        let mut mean = vec![0.0; FEATURE_COUNT];
        mean[FEATURE_COUNT - 1] = 50.0;
        model.scaler = Some(StandardScaler {
            mean,
            scale: vec![10.0; FEATURE_COUNT],
        });
        model.threshold = Some(0.9);

        let classifier = LogisticClassifier::new(model, 0.5).unwrap();
        assert_eq!(classifier.threshold(), 0.9);
        // z = (50 - 50) / 10 = 0
        assert!((classifier.probability(&record_with_amount(50.0)) - 0.5).abs() < 1e-12);
        assert_eq!(
            classifier.predict(&[record_with_amount(80.0)]).unwrap(),
            vec![1]
        );
    }

    #[test]
    fn test_rejects_wrong_arity() {
        let mut model = amount_model();
        model.weights.pop();
        let err = LogisticClassifier::new(model, 0.5).unwrap_err();
        assert!(err.to_string().contains("weights must have 30 entries, got 29"));
    }

    #[test]
    fn test_rejects_zero_scale() {
        let mut model = amount_model();
        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[3] = 0.0;
        model.scaler = Some(StandardScaler {
            mean: vec![0.0; FEATURE_COUNT],
            scale,
        });
        let err = LogisticClassifier::new(model, 0.5).unwrap_err();
        assert!(err.to_string().contains("V3"));
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let classifier = LogisticClassifier::new(amount_model(), 0.5).unwrap();
        let mut values = [0.0; FEATURE_COUNT];
        values[5] = f64::NAN;

        let err = classifier
            .predict(&[TransactionRecord::zeroed(), TransactionRecord::new(values)])
            .unwrap_err();
        match err {
            ClassifierError::NonFinite { row, column } => {
                assert_eq!(row, 2);
                assert_eq!(column, "V5");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json = serde_json::to_string(&amount_model()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let classifier = LogisticClassifier::from_json_file(file.path(), 0.5).unwrap();
        assert_eq!(classifier.name(), "amount");
        assert_eq!(
            classifier.predict(&[record_with_amount(1000.0)]).unwrap(),
            vec![1]
        );
    }
}
