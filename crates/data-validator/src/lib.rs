//! Form Input Validation
//!
//! Slider range checks for scenario inputs and parsing of the free-text
//! chart bounds.

mod bounds;
mod error;
mod validator;

pub use bounds::{ChartBounds, DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND};
pub use error::ValidationError;
pub use validator::{FormLimits, SliderSpec, ValidationResult, Validator};
