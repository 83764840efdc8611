//! ONNX model runner backed by tract

use crate::engine::RegressionModel;
use crate::pipeline::MODEL_OUTPUT_DIMENSION;
use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Regressor exported to ONNX (e.g. through sklearn-onnx)
pub struct OnnxModel {
    plan: OnnxPlan,
    source: String,
}

impl OnnxModel {
    /// Load, pin the input to `[1, 9]` f32 and optimize the graph
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let load_error =
            |e: TractError| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e));

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(0, f32::fact([1, FEATURE_DIMENSION]).into())
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(load_error)?;

        match plan.model().output_fact(0) {
            Ok(fact) => {
                if let Some(shape) = fact.shape.as_concrete() {
                    let outputs: usize = shape.iter().product();
                    if outputs != MODEL_OUTPUT_DIMENSION {
                        return Err(InferenceError::ModelLoadError(format!(
                            "{}: expected {} outputs, graph declares {:?}",
                            path.display(),
                            MODEL_OUTPUT_DIMENSION,
                            shape
                        )));
                    }
                }
            }
            Err(e) => warn!("Could not inspect ONNX output shape: {}", e),
        }

        debug!("ONNX plan ready for {}", path.display());
        Ok(Self {
            plan,
            source: path.display().to_string(),
        })
    }
}

impl RegressionModel for OnnxModel {
    fn predict(&self, features: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        let infer_error = |e: TractError| InferenceError::InferenceFailed(e.to_string());

        let data = features.to_f32();
        let input =
            Tensor::from_shape::<f32>(&[1, FEATURE_DIMENSION], &data).map_err(infer_error)?;
        let outputs = self.plan.run(tvec!(input.into())).map_err(infer_error)?;
        let first = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".into()))?;
        let values = first.cast_to::<f32>().map_err(infer_error)?;
        let values = values.as_slice::<f32>().map_err(infer_error)?;

        Ok(values.iter().map(|&v| v as f64).collect())
    }

    fn describe(&self) -> String {
        format!("onnx ({})", self.source)
    }
}
