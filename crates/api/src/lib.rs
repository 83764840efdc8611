//! KMHCAL23 Form Server
//!
//! HTTP surface for the ground motion model: the form schema, predictions,
//! the spectrum chart and the CSV download.

use axum::{extract::State, response::IntoResponse, routing::get, routing::post, Json, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

pub mod config;
mod error;
mod routes;

pub use config::{AppConfig, ChartConfig, LoggingConfig};
pub use error::{ApiError, ErrorBody, LoggingError};
pub use routes::predict::{ChartRequest, PredictionResponse, ScenarioRequest};

use data_validator::Validator;
use feature_engine::FeatureEncoder;
use inference_engine::{InferenceEngine, PredictionPipeline};
use report::SpectrumChart;

/// Application state shared across handlers. Read-only after startup.
pub struct AppState {
    pub pipeline: PredictionPipeline,
    pub encoder: FeatureEncoder,
    pub validator: Validator,
    pub chart: SpectrumChart,
    pub chart_config: ChartConfig,
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state around a loaded pipeline
    pub fn new(pipeline: PredictionPipeline, config: &AppConfig) -> Result<Self, ApiError> {
        Ok(Self {
            pipeline,
            encoder: FeatureEncoder::new(),
            validator: Validator::new(config.limits.clone()),
            chart: SpectrumChart::new(config.chart.width, config.chart.height)?,
            chart_config: config.chart.clone(),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        })
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: String,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/form", get(routes::form::get_form))
        .route("/api/v1/predict", post(routes::predict::predict))
        .route("/api/v1/spectrum.csv", post(routes::predict::spectrum_csv))
        .route("/api/v1/spectrum.png", post(routes::predict::spectrum_png))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: state.pipeline.engine().describe(),
    })
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let level = config.max_level()?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Load the model, then serve until shutdown
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    // The model is loaded exactly once; a bad artifact stops startup.
    let engine = InferenceEngine::load(&config.model.path)?;
    let pipeline = PredictionPipeline::new(engine);

    let handle = PrometheusBuilder::new().install_recorder()?;
    let state = Arc::new(AppState::new(pipeline, &config)?.with_metrics(handle));
    let app = create_router(state);

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let config = LoggingConfig {
            level: "verbose".to_string(),
            json: false,
        };
        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::InvalidLevel(_))
        ));
    }
}
