//! Ground Motion Inference Engine
//!
//! Loads the pre-trained regression model once and turns its log-space
//! output into PGA, PGV and a response spectrum.

mod engine;
mod mlp;
mod onnx;
mod pipeline;

pub use engine::{InferenceEngine, MockModel, RegressionModel};
pub use mlp::{Activation, MlpModel};
pub use onnx::OnnxModel;
pub use pipeline::{
    GroundMotion, PredictionPipeline, SpectrumPoint, MODEL_OUTPUT_DIMENSION, SPECTRAL_PERIODS,
};

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Invalid output shape: expected {expected} values, got {actual}")]
    InvalidOutputShape { expected: usize, actual: usize },
    #[error("Invalid period list: {0}")]
    InvalidPeriods(String),
}
