//! Slider limit validation for scenario inputs

use crate::error::ValidationError;
use feature_engine::ScenarioInput;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One numeric slider on the form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliderSpec {
    /// Label shown next to the slider
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Initial slider position
    pub default: f64,
    /// Help tooltip
    pub help: String,
}

impl SliderSpec {
    fn new(label: &str, min: f64, max: f64, step: f64, default: f64, help: &str) -> Self {
        Self {
            label: label.to_string(),
            min,
            max,
            step,
            default,
            help: help.to_string(),
        }
    }

    /// Check range and step alignment
    pub fn check(&self, field: &'static str, value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field, value });
        }
        if value < self.min || value > self.max {
            return Err(ValidationError::OutOfRange {
                field,
                value,
                min: self.min,
                max: self.max,
            });
        }
        if self.step > 0.0 {
            let steps = (value - self.min) / self.step;
            if (steps - steps.round()).abs() > 1e-6 {
                return Err(ValidationError::OffStep {
                    field,
                    value,
                    step: self.step,
                });
            }
        }
        Ok(())
    }
}

/// Slider configuration for the three numeric inputs.
///
/// The magnitude help text says 6.8 while the slider stops at 6.5; the
/// slider bound is the one enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormLimits {
    pub magnitude: SliderSpec,
    pub distance: SliderSpec,
    pub focal_depth: SliderSpec,
}

impl Default for FormLimits {
    fn default() -> Self {
        Self {
            magnitude: SliderSpec::new(
                "Mw",
                5.0,
                6.5,
                0.1,
                6.5,
                "Please enter a value between 5.0 and 6.8",
            ),
            distance: SliderSpec::new(
                "RJB",
                0.0,
                270.0,
                1.0,
                100.0,
                "Please enter a value between 0 and 148 km",
            ),
            focal_depth: SliderSpec::new(
                "Focal Depth",
                5.0,
                18.0,
                0.1,
                10.0,
                "Please enter a value between 5 and 17.3 km",
            ),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
}

/// Validates scenarios against the configured sliders
#[derive(Debug, Clone, Default)]
pub struct Validator {
    limits: FormLimits,
}

impl Validator {
    /// Create a new validator with given limits
    pub fn new(limits: FormLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &FormLimits {
        &self.limits
    }

    /// Validate magnitude
    pub fn validate_magnitude(&self, value: f64) -> Result<(), ValidationError> {
        self.limits.magnitude.check("magnitude", value)
    }

    /// Validate Joyner-Boore distance
    pub fn validate_distance(&self, value: f64) -> Result<(), ValidationError> {
        self.limits.distance.check("distance", value)
    }

    /// Validate focal depth
    pub fn validate_focal_depth(&self, value: f64) -> Result<(), ValidationError> {
        self.limits.focal_depth.check("focal_depth", value)
    }

    /// Validate every numeric field of a scenario
    pub fn validate_scenario(&self, input: &ScenarioInput) -> ValidationResult {
        let errors: Vec<ValidationError> = [
            self.validate_magnitude(input.magnitude),
            self.validate_distance(input.distance),
            self.validate_focal_depth(input.focal_depth),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if !errors.is_empty() {
            debug!("Scenario rejected: {} invalid fields", errors.len());
        }

        ValidationResult {
            valid: errors.is_empty(),
            errors,
        }
    }
}
