//! Dense multi-layer perceptron regressor loaded from JSON.
//!
//! The layout follows a fitted sklearn `MLPRegressor`: `coefs[i]` is an
//! `inputs x outputs` matrix, hidden layers share one activation and the
//! output layer is linear.

use crate::engine::RegressionModel;
use crate::pipeline::MODEL_OUTPUT_DIMENSION;
use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Hidden layer activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Identity,
    Logistic,
    Tanh,
    Relu,
}

impl Activation {
    fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Identity => x,
            Activation::Logistic => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
        }
    }
}

fn default_activation() -> Activation {
    Activation::Relu
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpModel {
    #[serde(default = "default_activation")]
    pub activation: Activation,
    pub coefs: Vec<Vec<Vec<f64>>>,
    pub intercepts: Vec<Vec<f64>>,
}

impl MlpModel {
    /// Read and validate a JSON export
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        })?;
        let model: MlpModel = serde_json::from_str(&raw).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        })?;
        model.validate()?;
        debug!(
            "MLP loaded: layers={:?} activation={:?}",
            model.layer_sizes(),
            model.activation
        );
        Ok(model)
    }

    /// Layer widths from input to output
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.coefs.len() + 1);
        if let Some(first) = self.coefs.first() {
            sizes.push(first.len());
        }
        sizes.extend(self.intercepts.iter().map(|b| b.len()));
        sizes
    }

    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.coefs.is_empty() {
            return Err(InferenceError::ModelLoadError("MLP has no layers".to_string()));
        }
        if self.coefs.len() != self.intercepts.len() {
            return Err(InferenceError::ModelLoadError(format!(
                "{} weight matrices but {} bias vectors",
                self.coefs.len(),
                self.intercepts.len()
            )));
        }

        let mut width = FEATURE_DIMENSION;
        for (layer, (weights, bias)) in self.coefs.iter().zip(&self.intercepts).enumerate() {
            if weights.len() != width {
                return Err(InferenceError::InvalidInputShape {
                    expected: format!("layer {} with {} inputs", layer, width),
                    actual: format!("{} inputs", weights.len()),
                });
            }
            if let Some(row) = weights.iter().position(|row| row.len() != bias.len()) {
                return Err(InferenceError::ModelLoadError(format!(
                    "layer {} row {} has {} weights, expected {}",
                    layer,
                    row,
                    weights[row].len(),
                    bias.len()
                )));
            }
            width = bias.len();
        }

        if width != MODEL_OUTPUT_DIMENSION {
            return Err(InferenceError::ModelLoadError(format!(
                "MLP produces {} outputs, expected {}",
                width, MODEL_OUTPUT_DIMENSION
            )));
        }
        Ok(())
    }

    /// Forward pass
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        let last = self.coefs.len().saturating_sub(1);
        let mut activations = input.to_vec();

        for (layer, (weights, bias)) in self.coefs.iter().zip(&self.intercepts).enumerate() {
            let mut next = bias.clone();
            for (x, row) in activations.iter().zip(weights) {
                for (out, w) in next.iter_mut().zip(row) {
                    *out += x * w;
                }
            }
            if layer != last {
                for v in next.iter_mut() {
                    *v = self.activation.apply(*v);
                }
            }
            activations = next;
        }

        activations
    }
}

impl RegressionModel for MlpModel {
    fn predict(&self, features: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        Ok(self.forward(&features.values))
    }

    fn describe(&self) -> String {
        format!("mlp {:?} ({:?})", self.layer_sizes(), self.activation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// 9 -> 2 -> 15 network with hand-picked weights
    fn small_model() -> MlpModel {
        let mut hidden = vec![vec![0.0; 2]; FEATURE_DIMENSION];
        hidden[0] = vec![1.0, 0.0]; // magnitude
        hidden[1] = vec![0.0, -1.0]; // distance
        let output = vec![vec![1.0; MODEL_OUTPUT_DIMENSION], vec![0.5; MODEL_OUTPUT_DIMENSION]];
        MlpModel {
            activation: Activation::Relu,
            coefs: vec![hidden, output],
            intercepts: vec![vec![0.0, 1.0], vec![0.25; MODEL_OUTPUT_DIMENSION]],
        }
    }

    #[test]
    fn test_forward_pass() {
        let model = small_model();
        model.validate().unwrap();

        let mut features = FeatureVector::default();
        features.values[0] = 6.0;
        features.values[1] = 0.5;

        // hidden = relu([6.0, 1.0 - 0.5]) = [6.0, 0.5]
        // out = 6.0 * 1.0 + 0.5 * 0.5 + 0.25
        let out = model.predict(&features).unwrap();
        assert_eq!(out.len(), MODEL_OUTPUT_DIMENSION);
        assert!((out[0] - 6.5).abs() < 1e-12);
    }

    #[test]
    fn test_relu_clamps_hidden_units() {
        let model = small_model();
        let mut features = FeatureVector::default();
        features.values[1] = 100.0;

        // second hidden unit is 1 - 100 -> clamped to 0
        let out = model.predict(&features).unwrap();
        assert!((out[3] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_wrong_input_width_rejected() {
        let mut model = small_model();
        model.coefs[0].pop();
        assert!(matches!(
            model.validate(),
            Err(InferenceError::InvalidInputShape { .. })
        ));
    }

    #[test]
    fn test_wrong_output_width_rejected() {
        let mut model = small_model();
        for row in model.coefs[1].iter_mut() {
            row.pop();
        }
        model.intercepts[1].pop();
        assert!(matches!(model.validate(), Err(InferenceError::ModelLoadError(_))));
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json = serde_json::to_string(&small_model()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = MlpModel::load(file.path()).unwrap();
        assert_eq!(loaded.layer_sizes(), vec![FEATURE_DIMENSION, 2, MODEL_OUTPUT_DIMENSION]);
        assert_eq!(loaded.activation, Activation::Relu);
    }

    #[test]
    fn test_activation_defaults_to_relu() {
        let model = small_model();
        let mut value = serde_json::to_value(&model).unwrap();
        value.as_object_mut().unwrap().remove("activation");
        let parsed: MlpModel = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.activation, Activation::Relu);
    }
}
