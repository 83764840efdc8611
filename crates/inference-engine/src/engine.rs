//! Inference Engine Implementation

use crate::mlp::MlpModel;
use crate::onnx::OnnxModel;
use crate::InferenceError;
use feature_engine::FeatureVector;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A pre-trained regressor mapping 9 features to 15 natural-log outputs.
///
/// Implementations are opaque; the pipeline only relies on the shape of
/// the output, which it checks on every call.
pub trait RegressionModel: Send + Sync {
    /// Predict raw log-space outputs for one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<Vec<f64>, InferenceError>;

    /// Short description for logs and health output
    fn describe(&self) -> String;
}

/// Model returning a fixed output vector, used when no artifact is available
#[derive(Debug, Clone)]
pub struct MockModel {
    output: Vec<f64>,
}

impl MockModel {
    /// Create a mock that always returns `output`
    pub fn new(output: Vec<f64>) -> Self {
        Self { output }
    }
}

impl RegressionModel for MockModel {
    fn predict(&self, _features: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        Ok(self.output.clone())
    }

    fn describe(&self) -> String {
        format!("mock ({} outputs)", self.output.len())
    }
}

/// Loaded model plus where it came from
pub struct InferenceEngine {
    /// Model path
    model_path: PathBuf,
    model: Box<dyn RegressionModel>,
}

impl InferenceEngine {
    /// Load the model artifact at `path`. The format follows the extension:
    /// `.onnx` runs through tract, `.json` is a dense MLP export.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading ground motion model from {}", path.display());

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let model: Box<dyn RegressionModel> = match extension.as_deref() {
            Some("onnx") => Box::new(OnnxModel::load(path)?),
            Some("json") => Box::new(MlpModel::load(path)?),
            _ => {
                return Err(InferenceError::ModelLoadError(format!(
                    "unsupported model artifact {} (expected .onnx or .json)",
                    path.display()
                )))
            }
        };

        info!("Model loaded successfully: {}", model.describe());
        Ok(Self {
            model_path: path.to_path_buf(),
            model,
        })
    }

    /// Wrap an already constructed model
    pub fn from_model(model: Box<dyn RegressionModel>) -> Self {
        Self {
            model_path: PathBuf::from("<in-memory>"),
            model,
        }
    }

    /// Create a mock inference engine for testing
    pub fn mock(output: Vec<f64>) -> Self {
        info!("Creating mock inference engine");
        Self {
            model_path: PathBuf::from("mock"),
            model: Box::new(MockModel::new(output)),
        }
    }

    /// Run the model on a feature vector
    pub fn predict(&self, features: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        let start = std::time::Instant::now();
        let output = self.model.predict(features)?;
        debug!(
            "Inference completed in {}us ({} outputs)",
            start.elapsed().as_micros(),
            output.len()
        );

        if let Some(pos) = output.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::InferenceFailed(format!(
                "model output {} is not finite ({})",
                pos, output[pos]
            )));
        }
        Ok(output)
    }

    /// Description of the loaded model
    pub fn describe(&self) -> String {
        self.model.describe()
    }

    /// Get model path
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::MODEL_OUTPUT_DIMENSION;
    use std::io::Write;

    #[test]
    fn test_mock_prediction() {
        let engine = InferenceEngine::mock(vec![0.5; MODEL_OUTPUT_DIMENSION]);
        let output = engine.predict(&FeatureVector::default()).unwrap();
        assert_eq!(output.len(), MODEL_OUTPUT_DIMENSION);
        assert_eq!(engine.model_path(), Path::new("mock"));
    }

    #[test]
    fn test_nan_output_is_rejected() {
        let mut output = vec![1.0; MODEL_OUTPUT_DIMENSION];
        output[4] = f64::NAN;
        let engine = InferenceEngine::mock(output);
        assert!(matches!(
            engine.predict(&FeatureVector::default()),
            Err(InferenceError::InferenceFailed(_))
        ));
    }

    #[test]
    fn test_unknown_extension_fails_to_load() {
        let mut file = tempfile::Builder::new().suffix(".pkl").tempfile().unwrap();
        file.write_all(b"not a model").unwrap();
        assert!(matches!(
            InferenceEngine::load(file.path()),
            Err(InferenceError::ModelLoadError(_))
        ));
    }

    #[test]
    fn test_missing_artifact_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(InferenceEngine::load(dir.path().join("MLP.json")).is_err());
        assert!(InferenceEngine::load(dir.path().join("MLP.onnx")).is_err());
    }

    #[test]
    fn test_corrupt_onnx_fails_to_load() {
        let mut file = tempfile::Builder::new().suffix(".onnx").tempfile().unwrap();
        file.write_all(b"\x00\x01garbage").unwrap();
        assert!(matches!(
            InferenceEngine::load(file.path()),
            Err(InferenceError::ModelLoadError(_))
        ));
    }
}
