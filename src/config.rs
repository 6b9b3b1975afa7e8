//! Configuration management for the inference gateway

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Serialized model representation
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// Pick by file extension (`.onnx` or `.json`)
    #[default]
    Auto,
    /// ONNX graph run through ONNX Runtime
    Onnx,
    /// JSON logistic model
    Logistic,
}

impl ModelFormat {
    /// Resolve `Auto` against the model path
    pub fn resolve(self, path: &Path) -> Result<Self> {
        if self != ModelFormat::Auto {
            return Ok(self);
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("onnx") => Ok(ModelFormat::Onnx),
            Some("json") => Ok(ModelFormat::Logistic),
            _ => bail!(
                "Cannot infer model format from {}; set model.format to onnx or logistic",
                path.display()
            ),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Classifier configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the serialized classifier
    pub path: String,
    /// Representation of the file at `path`
    #[serde(default)]
    pub format: ModelFormat,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
    /// Fraud probability at or above which a row is labeled `1`,
    /// used when the model reports probabilities instead of labels
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_onnx_threads() -> usize {
    1
}

fn default_threshold() -> f64 {
    0.5
}

/// Result output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// File name for the downloadable results CSV
    pub file_name: String,
    /// Rows printed in the terminal preview
    pub preview_rows: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Default location of the configuration file
    pub const DEFAULT_PATH: &'static str = "config/gateway.toml";

    /// Load configuration from the default location.
    ///
    /// A missing file is not an error; built-in defaults and environment
    /// overrides still apply.
    pub fn load() -> Result<Self> {
        Self::build(Path::new(Self::DEFAULT_PATH), false)
    }

    /// Load configuration from a specific path, which must exist
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::build(path.as_ref(), true)
    }

    fn build(path: &Path, required: bool) -> Result<Self> {
        Self::build_with_env(path, required, Self::environment())
    }

    /// `GATEWAY__SECTION__KEY` overrides, e.g. `GATEWAY__MODEL__ONNX_THREADS=4`
    fn environment() -> Environment {
        Environment::with_prefix("GATEWAY")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn build_with_env(path: &Path, required: bool, environment: Environment) -> Result<Self> {
        let defaults = AppConfig::default();

        let config = Config::builder()
            .set_default("model.path", defaults.model.path)?
            .set_default("model.format", "auto")?
            .set_default("model.onnx_threads", defaults.model.onnx_threads as u64)?
            .set_default("model.threshold", defaults.model.threshold)?
            .set_default("output.file_name", defaults.output.file_name)?
            .set_default("output.preview_rows", defaults.output.preview_rows as u64)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .add_source(File::from(path).required(required))
            .add_source(environment)
            .build()
            .context("Failed to build configuration")?;

        let config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.model.threshold) {
            bail!(
                "model.threshold must be within [0, 1], got {}",
                self.model.threshold
            );
        }
        if self.model.onnx_threads == 0 {
            bail!("model.onnx_threads must be at least 1");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                path: "models/fraud_model.onnx".to_string(),
                format: ModelFormat::Auto,
                onnx_threads: default_onnx_threads(),
                threshold: default_threshold(),
            },
            output: OutputConfig {
                file_name: "intellisecure_predictions.csv".to_string(),
                preview_rows: 20,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.model.path, "models/fraud_model.onnx");
        assert_eq!(config.model.format, ModelFormat::Auto);
        assert_eq!(config.model.threshold, 0.5);
        assert_eq!(config.output.file_name, "intellisecure_predictions.csv");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[model]\npath = \"models/linear.json\"\nformat = \"logistic\"\nthreshold = 0.7\n\n[output]\nfile_name = \"out.csv\"\npreview_rows = 5"
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.model.path, "models/linear.json");
        assert_eq!(config.model.format, ModelFormat::Logistic);
        assert_eq!(config.model.threshold, 0.7);
        assert_eq!(config.model.onnx_threads, 1);
        assert_eq!(config.output.file_name, "out.csv");
        assert_eq!(config.output.preview_rows, 5);
        // Missing section falls back to defaults
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_missing_required_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from_path(dir.path().join("absent.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[model]\nthreshold = 1.5").unwrap();

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn test_env_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[model]\nonnx_threads = 2\nthreshold = 0.6").unwrap();

        let vars: config::Map<String, String> = [
            ("GATEWAY__MODEL__ONNX_THREADS", "4"),
            ("GATEWAY__MODEL__PATH", "models/override.json"),
            ("GATEWAY__OUTPUT__PREVIEW_ROWS", "7"),
            ("OTHER__MODEL__THRESHOLD", "0.9"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let env = AppConfig::environment().source(Some(vars));
        let config = AppConfig::build_with_env(file.path(), true, env).unwrap();

        assert_eq!(config.model.onnx_threads, 4);
        assert_eq!(config.model.path, "models/override.json");
        assert_eq!(config.output.preview_rows, 7);
        // Unprefixed variables are ignored; the file value stands
        assert_eq!(config.model.threshold, 0.6);
    }

    #[test]
    fn test_env_override_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let vars: config::Map<String, String> =
            [("GATEWAY__MODEL__ONNX_THREADS".to_string(), "0".to_string())]
                .into_iter()
                .collect();

        let env = AppConfig::environment().source(Some(vars));
        let err = AppConfig::build_with_env(&dir.path().join("absent.toml"), false, env)
            .unwrap_err();
        assert!(err.to_string().contains("onnx_threads"));
    }

    #[test]
    fn test_model_format_resolution() {
        assert_eq!(
            ModelFormat::Auto.resolve(Path::new("m/model.onnx")).unwrap(),
            ModelFormat::Onnx
        );
        assert_eq!(
            ModelFormat::Auto.resolve(Path::new("m/model.JSON")).unwrap(),
            ModelFormat::Logistic
        );
        assert_eq!(
            ModelFormat::Onnx.resolve(Path::new("m/model.bin")).unwrap(),
            ModelFormat::Onnx
        );
        assert!(ModelFormat::Auto.resolve(Path::new("m/fraud_model.pkl")).is_err());
    }
}
