//! Prediction Reports
//!
//! The three rendering sinks fed by the prediction pipeline: the scalar
//! summary, the spectrum CSV download and the log-log spectrum chart.

mod chart;
mod export;
mod summary;

pub use chart::{
    SpectrumChart, CHART_PERIOD_RANGE, DEFAULT_CHART_SIZE, X_AXIS_TITLE, Y_AXIS_TITLE,
};
pub use export::{spectrum_csv, CSV_FILE_NAME, CSV_MIME};
pub use summary::{format_value, Summary};

use thiserror::Error;

/// Report rendering errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV export failed: {0}")]
    Csv(String),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Chart font failed to load: {0}")]
    Font(String),
    #[error("Chart size {width}x{height} is too small")]
    ChartTooSmall { width: u32, height: u32 },
}
