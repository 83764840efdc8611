//! Feature Vector Assembly

use crate::scenario::{Mechanism, ScenarioInput, SoilClass};
use crate::EncodingError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of features the model consumes
pub const FEATURE_DIMENSION: usize = 9;

/// Column order of the training frame. The model silently mispredicts if
/// this order drifts from the one it was fitted on.
pub const FEATURE_NAMES: [&str; FEATURE_DIMENSION] = [
    "Mw",
    "Rjb",
    "Depth",
    "Mechanism_Normal",
    "Mechanism_Strike-slip",
    "Mechanism_Thrust",
    "Vs30_255",
    "Vs30_310",
    "Vs30_520",
];

const MAGNITUDE: usize = 0;
const DISTANCE: usize = 1;
const DEPTH: usize = 2;
const MECHANISM_OFFSET: usize = 3;
const SOIL_OFFSET: usize = 6;

/// Feature vector for ML inference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Raw feature values in training column order
    pub values: [f64; FEATURE_DIMENSION],
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            values: [0.0; FEATURE_DIMENSION],
        }
    }
}

impl FeatureVector {
    pub fn magnitude(&self) -> f64 {
        self.values[MAGNITUDE]
    }

    pub fn distance(&self) -> f64 {
        self.values[DISTANCE]
    }

    pub fn depth(&self) -> f64 {
        self.values[DEPTH]
    }

    /// Mechanism indicators (normal, strike-slip, reverse)
    pub fn mechanism_indicators(&self) -> [f64; 3] {
        [
            self.values[MECHANISM_OFFSET],
            self.values[MECHANISM_OFFSET + 1],
            self.values[MECHANISM_OFFSET + 2],
        ]
    }

    /// Soil indicators (NEHRP D, generic soil, NEHRP C)
    pub fn soil_indicators(&self) -> [f64; 3] {
        [
            self.values[SOIL_OFFSET],
            self.values[SOIL_OFFSET + 1],
            self.values[SOIL_OFFSET + 2],
        ]
    }

    /// Decode the mechanism one-hot group
    pub fn mechanism(&self) -> Result<Mechanism, EncodingError> {
        let indicators = self.mechanism_indicators();
        hot_index(&indicators)
            .map(|i| Mechanism::ALL[i])
            .ok_or(EncodingError::NotOneHot {
                group: "mechanism",
                indicators,
            })
    }

    /// Decode the soil one-hot group
    pub fn soil(&self) -> Result<SoilClass, EncodingError> {
        let indicators = self.soil_indicators();
        hot_index(&indicators)
            .map(|i| SoilClass::ALL[i])
            .ok_or(EncodingError::NotOneHot {
                group: "soil",
                indicators,
            })
    }

    /// Recover the scenario this vector was encoded from
    pub fn decode(&self) -> Result<ScenarioInput, EncodingError> {
        Ok(ScenarioInput {
            magnitude: self.magnitude(),
            distance: self.distance(),
            focal_depth: self.depth(),
            mechanism: self.mechanism()?,
            soil: self.soil()?,
        })
    }

    /// Values narrowed to f32 for tensor runtimes
    pub fn to_f32(&self) -> [f32; FEATURE_DIMENSION] {
        self.values.map(|v| v as f32)
    }
}

fn hot_index(indicators: &[f64; 3]) -> Option<usize> {
    let mut hot = None;
    for (i, &v) in indicators.iter().enumerate() {
        if v == 1.0 {
            if hot.is_some() {
                return None;
            }
            hot = Some(i);
        } else if v != 0.0 {
            return None;
        }
    }
    hot
}

/// Encodes scenarios into model features
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self
    }

    /// Encode a scenario
    pub fn encode(&self, input: &ScenarioInput) -> FeatureVector {
        let mut values = [0.0; FEATURE_DIMENSION];
        values[MAGNITUDE] = input.magnitude;
        values[DISTANCE] = input.distance;
        values[DEPTH] = input.focal_depth;
        values[MECHANISM_OFFSET + input.mechanism.index()] = 1.0;
        values[SOIL_OFFSET + input.soil.index()] = 1.0;

        debug!(
            "Encoded scenario Mw={} Rjb={} depth={} {} / {}",
            input.magnitude, input.distance, input.focal_depth, input.mechanism, input.soil
        );

        FeatureVector { values }
    }

    /// Encode straight from form labels
    pub fn encode_labels(
        &self,
        magnitude: f64,
        distance: f64,
        focal_depth: f64,
        mechanism: &str,
        soil: &str,
    ) -> Result<FeatureVector, EncodingError> {
        let input = ScenarioInput::from_labels(magnitude, distance, focal_depth, mechanism, soil)?;
        Ok(self.encode(&input))
    }
}
