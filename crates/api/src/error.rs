//! API error mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use feature_engine::EncodingError;
use inference_engine::InferenceError;
use report::ReportError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Malformed request body: {}", .0.body_text())]
    Body(#[from] JsonRejection),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{}", join_errors(.0))]
    InvalidScenario(Vec<ValidationError>),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApiError {
    /// Bad form input, as opposed to a pipeline failure
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ApiError::Body(_)
                | ApiError::Encoding(_)
                | ApiError::Validation(_)
                | ApiError::InvalidScenario(_)
        )
    }
}

/// Errors while installing the log subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level {0:?} (expected trace, debug, info, warn or error)")]
    InvalidLevel(String),
    #[error(transparent)]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = if self.is_input_error() {
            warn!("Rejected form input: {}", self);
            metrics::counter!("gmm_input_errors_total").increment(1);
            (StatusCode::UNPROCESSABLE_ENTITY, "input")
        } else {
            error!("Prediction pipeline failed: {}", self);
            metrics::counter!("gmm_pipeline_errors_total").increment(1);
            (StatusCode::INTERNAL_SERVER_ERROR, "pipeline")
        };

        let body = ErrorBody {
            error: self.to_string(),
            kind,
        };
        (status, Json(body)).into_response()
    }
}
