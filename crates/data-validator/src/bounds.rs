//! Chart bound parsing

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Default lower bound text shown on the form
pub const DEFAULT_LOWER_BOUND: &str = "0.1";
/// Default upper bound text shown on the form
pub const DEFAULT_UPPER_BOUND: &str = "100000";

/// Vertical PSA range of the spectrum chart (cm/s^2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartBounds {
    pub lower: f64,
    pub upper: f64,
}

impl Default for ChartBounds {
    fn default() -> Self {
        Self {
            lower: 0.1,
            upper: 100_000.0,
        }
    }
}

impl ChartBounds {
    /// Parse the two free-text bounds
    pub fn parse(lower: &str, upper: &str) -> Result<Self, ValidationError> {
        let lower = parse_bound("lower bound", lower)?;
        let upper = parse_bound("upper bound", upper)?;
        Self::new(lower, upper)
    }

    /// Validate numeric bounds
    pub fn new(lower: f64, upper: f64) -> Result<Self, ValidationError> {
        check_bound("lower bound", lower)?;
        check_bound("upper bound", upper)?;
        if lower >= upper {
            return Err(ValidationError::InvertedBounds { lower, upper });
        }
        Ok(Self { lower, upper })
    }
}

fn parse_bound(field: &'static str, input: &str) -> Result<f64, ValidationError> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            input: input.to_string(),
        })?;
    check_bound(field, value)?;
    Ok(value)
}

fn check_bound(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field, value });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveBound { field, value });
    }
    Ok(())
}
