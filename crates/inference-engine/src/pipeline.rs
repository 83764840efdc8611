//! Prediction pipeline: log-space model output to physical intensity measures

use crate::engine::InferenceEngine;
use crate::InferenceError;
use feature_engine::FeatureVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Oscillator periods (s) in the order the model emits its PSA outputs.
pub const SPECTRAL_PERIODS: [f64; 13] = [
    0.03, 0.05, 0.1, 0.15, 0.2, 0.25, 0.3, 0.4, 0.5, 0.75, 1.0, 1.5, 2.0,
];

/// PGA, PGV, then one value per spectral period
pub const MODEL_OUTPUT_DIMENSION: usize = 2 + SPECTRAL_PERIODS.len();

/// One point of the response spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumPoint {
    /// Oscillator period (s)
    pub period: f64,
    /// Pseudo-spectral acceleration (cm/s^2)
    pub psa: f64,
}

/// Predicted ground motion for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundMotion {
    /// Peak ground acceleration (cm/s^2)
    pub pga: f64,
    /// Peak ground velocity (cm/s)
    pub pgv: f64,
    /// Response spectrum sorted by ascending period
    pub spectrum: Vec<SpectrumPoint>,
}

/// Encoded features -> model -> exp -> (PGA, PGV, spectrum)
pub struct PredictionPipeline {
    engine: InferenceEngine,
    /// Periods in model output order
    periods: Vec<f64>,
}

impl PredictionPipeline {
    /// Pipeline over the canonical period list
    pub fn new(engine: InferenceEngine) -> Self {
        Self {
            engine,
            periods: SPECTRAL_PERIODS.to_vec(),
        }
    }

    /// Pipeline for a model whose PSA outputs follow `periods`. The list must
    /// hold distinct, finite, positive periods.
    pub fn with_periods(engine: InferenceEngine, periods: Vec<f64>) -> Result<Self, InferenceError> {
        if periods.is_empty() {
            return Err(InferenceError::InvalidPeriods("period list is empty".into()));
        }
        if let Some(p) = periods.iter().find(|p| !p.is_finite() || **p <= 0.0) {
            return Err(InferenceError::InvalidPeriods(format!(
                "period {} is not a positive finite number",
                p
            )));
        }
        let mut sorted = periods.clone();
        sorted.sort_by(f64::total_cmp);
        if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(InferenceError::InvalidPeriods(format!(
                "period {} appears more than once",
                pair[0]
            )));
        }

        info!("Prediction pipeline using {} custom periods", periods.len());
        Ok(Self { engine, periods })
    }

    /// Number of values the model must return
    pub fn expected_outputs(&self) -> usize {
        2 + self.periods.len()
    }

    /// Underlying engine
    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// Run one prediction
    pub fn run(&self, features: &FeatureVector) -> Result<GroundMotion, InferenceError> {
        let start = std::time::Instant::now();

        let log_values = self.engine.predict(features)?;
        if log_values.len() != self.expected_outputs() {
            return Err(InferenceError::InvalidOutputShape {
                expected: self.expected_outputs(),
                actual: log_values.len(),
            });
        }

        let values: Vec<f64> = log_values.iter().map(|v| v.exp()).collect();
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::InferenceFailed(format!(
                "output {} overflows after exp (ln value {})",
                pos, log_values[pos]
            )));
        }
        let pga = values[0];
        let pgv = values[1];

        let mut spectrum: Vec<SpectrumPoint> = self
            .periods
            .iter()
            .zip(&values[2..])
            .map(|(&period, &psa)| SpectrumPoint { period, psa })
            .collect();
        spectrum.sort_by(|a, b| a.period.total_cmp(&b.period));

        let elapsed = start.elapsed();
        metrics::counter!("gmm_predictions_total").increment(1);
        metrics::histogram!("gmm_prediction_latency_seconds").record(elapsed.as_secs_f64());
        debug!(
            "Prediction: PGA={:.2} PGV={:.2} ({} PSA points, {}us)",
            pga,
            pgv,
            spectrum.len(),
            elapsed.as_micros()
        );

        Ok(GroundMotion { pga, pgv, spectrum })
    }
}
