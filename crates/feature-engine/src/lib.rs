//! Feature Engineering Engine
//!
//! Encodes earthquake scenarios into the fixed feature vector the ground
//! motion model was trained on.

mod features;
mod scenario;

pub use features::{FeatureVector, FeatureEncoder, FEATURE_DIMENSION, FEATURE_NAMES};
pub use scenario::{Mechanism, ScenarioInput, SoilClass};

use thiserror::Error;

/// Errors during scenario encoding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    #[error("Unknown fault mechanism: {0:?}")]
    UnknownMechanism(String),
    #[error("Unknown soil class: {0:?}")]
    UnknownSoilClass(String),
    #[error("{group} indicators are not one-hot: {indicators:?}")]
    NotOneHot {
        group: &'static str,
        indicators: [f64; 3],
    },
}
