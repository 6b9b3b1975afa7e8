//! ONNX Runtime classifier
//!
//! Runs a scikit-learn pipeline exported with skl2onnx. Such graphs expose an
//! int64 `label` output alongside class probabilities; labels are read
//! directly when present, otherwise the fraud probability is thresholded.

use crate::error::ClassifierError;
use crate::models::classifier::Classifier;
use crate::types::schema::FEATURE_COUNT;
use crate::types::transaction::TransactionRecord;
use ort::memory::Allocator;
use ort::session::Session;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::sync::Mutex;
use tracing::debug;

/// Loaded ONNX classifier with its resolved input/output names
pub struct OnnxClassifier {
    /// Model name
    name: String,
    /// ONNX Runtime session; `run` needs exclusive access
    session: Mutex<Session>,
    /// Input name for the feature matrix
    input_name: String,
    /// Output carrying predicted labels, if the graph has one
    label_output: Option<String>,
    /// Output carrying class probabilities, if the graph has one
    probability_output: Option<String>,
    /// Fraud probability threshold for probability-only graphs
    threshold: f32,
}

impl OnnxClassifier {
    /// Wrap a committed session, resolving input and output names
    pub fn new(name: &str, session: Session, threshold: f64) -> Self {
        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let names: Vec<&str> = session.outputs.iter().map(|o| o.name.as_str()).collect();
        let (label_output, probability_output) = resolve_outputs(&names);

        Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            label_output,
            probability_output,
            threshold: threshold as f32,
        }
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn label_output(&self) -> Option<&str> {
        self.label_output.as_deref()
    }

    pub fn probability_output(&self) -> Option<&str> {
        self.probability_output.as_deref()
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, records: &[TransactionRecord]) -> Result<Vec<i64>, ClassifierError> {
        let rows = records.len();

        // Input tensor - shape [rows, num_features]
        let mut data = Vec::with_capacity(rows * FEATURE_COUNT);
        for record in records {
            data.extend_from_slice(&record.to_f32());
        }
        let shape = vec![rows as i64, FEATURE_COUNT as i64];
        let input_tensor = Tensor::from_array((shape, data)).map_err(runtime_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ClassifierError::Session(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(runtime_error)?;

        // Prefer the label output: it is exactly what the pipeline's predict() returns
        if let Some(output) = self.label_output.as_deref().and_then(|n| outputs.get(n)) {
            if let Ok((_, labels)) = output.try_extract_tensor::<i64>() {
                debug!(model = %self.name, rows = rows, "Labels read from label output");
                return Ok(labels.to_vec());
            }
        }

        if let Some(output) = self
            .probability_output
            .as_deref()
            .and_then(|n| outputs.get(n))
        {
            if let Ok((shape, probs)) = output.try_extract_tensor::<f32>() {
                let dims: Vec<i64> = shape.iter().copied().collect();
                debug!(model = %self.name, rows = rows, dims = ?dims, "Labels derived from probabilities");
                return labels_from_probabilities(&dims, probs, rows, self.threshold);
            }

            // skl2onnx default: seq(map(int64, float)), one map per row
            if DynSequenceValueType::can_downcast(&output.dtype()) {
                let probs = fraud_probabilities_from_sequence(output, rows)?;
                debug!(model = %self.name, rows = rows, "Labels derived from seq(map) probabilities");
                return Ok(probs
                    .into_iter()
                    .map(|p| i64::from(p >= self.threshold))
                    .collect());
            }
        }

        Err(ClassifierError::MissingOutput(format!(
            "model {} has no int64 label output or readable probability output",
            self.name
        )))
    }
}

/// Pick the label and probability outputs by name.
///
/// Handles both the `label`/`probabilities` and the
/// `output_label`/`output_probability` naming schemes. A `label` output is
/// never taken as the probability output.
pub(crate) fn resolve_outputs(names: &[&str]) -> (Option<String>, Option<String>) {
    let label = names
        .iter()
        .find(|n| n.contains("label"))
        .map(|n| n.to_string());

    let candidates: Vec<&str> = names
        .iter()
        .copied()
        .filter(|n| !n.contains("label"))
        .collect();
    let probability = candidates
        .iter()
        .find(|n| n.contains("prob"))
        .or_else(|| candidates.iter().find(|n| n.contains("output")))
        .map(|n| n.to_string());

    (label, probability)
}

/// Read one fraud probability per row from a seq(map(int64, float)) output
fn fraud_probabilities_from_sequence(
    output: &DynValue,
    rows: usize,
) -> Result<Vec<f32>, ClassifierError> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| ClassifierError::Runtime(e.to_string()))?;
    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(|e| ClassifierError::Runtime(e.to_string()))?;

    if maps.len() != rows {
        return Err(ClassifierError::MissingOutput(format!(
            "probability sequence has {} entries for {} rows",
            maps.len(),
            rows
        )));
    }

    maps.iter()
        .enumerate()
        .map(|(i, map)| {
            let pairs = map
                .try_extract_key_values::<i64, f32>()
                .map_err(|e| ClassifierError::Runtime(e.to_string()))?;
            fraud_probability(&pairs).ok_or_else(|| {
                ClassifierError::MissingOutput(format!(
                    "no class probability in row {}",
                    i + 1
                ))
            })
        })
        .collect()
}

/// Fraud (class 1) probability from a class-to-probability map
pub(crate) fn fraud_probability(pairs: &[(i64, f32)]) -> Option<f32> {
    if let Some((_, p)) = pairs.iter().find(|(class, _)| *class == 1) {
        return Some(*p);
    }
    pairs
        .iter()
        .find(|(class, _)| *class == 0)
        .map(|(_, p)| 1.0 - *p)
}

fn runtime_error(e: ort::Error) -> ClassifierError {
    ClassifierError::Runtime(e.to_string())
}

/// Threshold fraud probabilities into labels.
///
/// Accepts `[rows, classes]` (fraud is class 1), `[rows, 1]` and `[rows]`
/// layouts.
pub(crate) fn labels_from_probabilities(
    dims: &[i64],
    data: &[f32],
    rows: usize,
    threshold: f32,
) -> Result<Vec<i64>, ClassifierError> {
    let fraud_probs: Vec<f32> = match dims {
        [r, classes] if *r as usize == rows && *classes >= 2 => {
            let classes = *classes as usize;
            (0..rows).map(|i| data[i * classes + 1]).collect()
        }
        [r, 1] if *r as usize == rows => data[..rows].to_vec(),
        [r] if *r as usize == rows => data[..rows].to_vec(),
        _ => {
            return Err(ClassifierError::MissingOutput(format!(
                "unexpected probability shape {:?} for {} rows",
                dims, rows
            )))
        }
    };

    Ok(fraud_probs
        .into_iter()
        .map(|p| i64::from(p >= threshold))
        .collect())
}
