//! Classifier loader

use crate::config::{ModelConfig, ModelFormat};
use crate::models::classifier::Classifier;
use crate::models::logistic::LogisticClassifier;
use crate::models::onnx::OnnxClassifier;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Loads the serialized classifier once at startup
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
    /// Default decision threshold for probability outputs
    threshold: f64,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread, 0.5 threshold)
    pub fn new() -> Self {
        Self::with_settings(1, 0.5)
    }

    /// Create a new model loader with specified threads and threshold
    pub fn with_settings(onnx_threads: usize, threshold: f64) -> Self {
        Self {
            onnx_threads,
            threshold,
        }
    }

    /// Create a loader from the `[model]` configuration section
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::with_settings(config.onnx_threads, config.threshold)
    }

    /// Load the classifier at `path`, resolving its format first
    pub fn load<P: AsRef<Path>>(
        &self,
        path: P,
        format: ModelFormat,
    ) -> Result<Arc<dyn Classifier>> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Model file not found: {}", path.display());
        }

        let classifier: Arc<dyn Classifier> = match format.resolve(path)? {
            ModelFormat::Onnx => Arc::new(self.load_onnx(path)?),
            // resolve never returns Auto
            ModelFormat::Logistic | ModelFormat::Auto => {
                Arc::new(LogisticClassifier::from_json_file(path, self.threshold)?)
            }
        };

        Ok(classifier)
    }

    /// Load a single ONNX model from file
    pub fn load_onnx<P: AsRef<Path>>(&self, path: P) -> Result<OnnxClassifier> {
        let path = path.as_ref();
        let name = model_name(path);

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let classifier = OnnxClassifier::new(&name, session, self.threshold);

        info!(
            model = %name,
            input = %classifier.input_name(),
            label_output = ?classifier.label_output(),
            probability_output = ?classifier.probability_output(),
            "Model loaded successfully"
        );

        Ok(classifier)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string()
}
