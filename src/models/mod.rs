//! Classifier implementations and loading

pub mod classifier;
pub mod loader;
pub mod logistic;
pub mod onnx;

pub use classifier::Classifier;
pub use loader::ModelLoader;
pub use logistic::{LogisticClassifier, LogisticModel};
pub use onnx::OnnxClassifier;
