//! Validation Error Types

use thiserror::Error;

/// Errors in user-supplied form values. All of them are recoverable: the
/// form reports them and waits for the next input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value not on the slider grid
    #[error("{field} value {value} is not a multiple of step {step}")]
    OffStep {
        field: &'static str,
        value: f64,
        step: f64,
    },

    /// Text that does not parse as a number
    #[error("{field} must be a number, got {input:?}")]
    InvalidNumber { field: &'static str, input: String },

    /// NaN or infinity
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    /// Zero or negative bound on a logarithmic axis
    #[error("{field} must be positive on a log axis, got {value}")]
    NonPositiveBound { field: &'static str, value: f64 },

    /// Lower bound not below upper bound
    #[error("lower bound {lower} must be less than upper bound {upper}")]
    InvertedBounds { lower: f64, upper: f64 },
}
