//! Prediction Routes

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ChartBounds;
use feature_engine::{FeatureVector, ScenarioInput};
use inference_engine::{GroundMotion, SpectrumPoint};
use report::{spectrum_csv as render_csv, Summary, CSV_FILE_NAME, CSV_MIME};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::FormJson;
use crate::{ApiError, AppState};

/// Scenario as submitted by the form
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioRequest {
    pub magnitude: f64,
    pub distance: f64,
    pub focal_depth: f64,
    /// "Normal", "Strike-slip" or "Reverse"
    pub mechanism: String,
    /// "NEHRP D", "Generic soil" or "NEHRP C"
    pub soil: String,
}

/// Scenario plus the free-text chart bounds
#[derive(Debug, Clone, Deserialize)]
pub struct ChartRequest {
    #[serde(flatten)]
    pub scenario: ScenarioRequest,
    pub lower_bound: Option<String>,
    pub upper_bound: Option<String>,
}

/// Response for the predict endpoint
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub summary: Summary,
    pub features: FeatureVector,
    pub pga: f64,
    pub pgv: f64,
    pub spectrum: Vec<SpectrumPoint>,
}

/// Encode, validate and run one scenario
fn evaluate(
    state: &AppState,
    request: &ScenarioRequest,
) -> Result<(ScenarioInput, FeatureVector, GroundMotion), ApiError> {
    let input = ScenarioInput::from_labels(
        request.magnitude,
        request.distance,
        request.focal_depth,
        &request.mechanism,
        &request.soil,
    )?;

    let result = state.validator.validate_scenario(&input);
    if !result.valid {
        return Err(ApiError::InvalidScenario(result.errors));
    }

    let features = state.encoder.encode(&input);
    let motion = state.pipeline.run(&features)?;
    Ok((input, features, motion))
}

/// Run a prediction
pub async fn predict(
    State(state): State<Arc<AppState>>,
    FormJson(request): FormJson<ScenarioRequest>,
) -> Result<Json<PredictionResponse>, ApiError> {
    metrics::counter!("gmm_requests_total", "route" => "predict").increment(1);
    let (input, features, motion) = evaluate(&state, &request)?;
    let summary = Summary::new(&input, &motion);
    info!("{} | {} | {}", summary.inputs, summary.pga, summary.pgv);

    Ok(Json(PredictionResponse {
        summary,
        features,
        pga: motion.pga,
        pgv: motion.pgv,
        spectrum: motion.spectrum,
    }))
}

/// Download the spectrum as CSV
pub async fn spectrum_csv(
    State(state): State<Arc<AppState>>,
    FormJson(request): FormJson<ScenarioRequest>,
) -> Result<Response, ApiError> {
    metrics::counter!("gmm_requests_total", "route" => "spectrum_csv").increment(1);
    let (_, _, motion) = evaluate(&state, &request)?;
    let body = render_csv(&motion.spectrum)?;

    Ok((
        [
            (header::CONTENT_TYPE, format!("{}; charset=utf-8", CSV_MIME)),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CSV_FILE_NAME),
            ),
        ],
        body,
    )
        .into_response())
}

/// Render the spectrum chart as PNG
pub async fn spectrum_png(
    State(state): State<Arc<AppState>>,
    FormJson(request): FormJson<ChartRequest>,
) -> Result<Response, ApiError> {
    metrics::counter!("gmm_requests_total", "route" => "spectrum_png").increment(1);
    let lower = request
        .lower_bound
        .as_deref()
        .unwrap_or(&state.chart_config.default_lower_bound);
    let upper = request
        .upper_bound
        .as_deref()
        .unwrap_or(&state.chart_config.default_upper_bound);
    let bounds = ChartBounds::parse(lower, upper)?;

    let (_, _, motion) = evaluate(&state, &request.scenario)?;
    let png = state.chart.render_png(&motion.spectrum, &bounds)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

#[cfg(test)]
mod tests {
    use crate::{create_router, AppConfig, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use inference_engine::{InferenceEngine, PredictionPipeline, MODEL_OUTPUT_DIMENSION};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router_with_output(output: Vec<f64>) -> Router {
        let pipeline = PredictionPipeline::new(InferenceEngine::mock(output));
        let state = AppState::new(pipeline, &AppConfig::default()).unwrap();
        create_router(Arc::new(state))
    }

    fn router() -> Router {
        let mut output = vec![4.0, 1.5];
        output.extend((0..13).map(|i| 6.0 - 0.25 * i as f64));
        assert_eq!(output.len(), MODEL_OUTPUT_DIMENSION);
        router_with_output(output)
    }

    fn scenario() -> Value {
        json!({
            "magnitude": 6.0,
            "distance": 100.0,
            "focal_depth": 10.0,
            "mechanism": "Strike-slip",
            "soil": "Generic soil"
        })
    }

    async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Vec<u8>, Option<String>) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec(), disposition)
    }

    #[tokio::test]
    async fn test_predict_returns_scalars_and_sorted_spectrum() {
        let (status, body, _) = post(router(), "/api/v1/predict", scenario()).await;
        assert_eq!(status, StatusCode::OK);

        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!((body["pga"].as_f64().unwrap() - 4.0f64.exp()).abs() < 1e-9);
        assert_eq!(body["summary"]["pgv"], "PGV= 4.48  cm/s");
        assert_eq!(
            body["features"]["values"],
            json!([6.0, 100.0, 10.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0])
        );

        let periods: Vec<f64> = body["spectrum"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["period"].as_f64().unwrap())
            .collect();
        assert_eq!(periods.len(), 13);
        assert!(periods.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_unknown_mechanism_is_input_error() {
        let mut body = scenario();
        body["mechanism"] = json!("Oblique");
        let (status, body, _) = post(router(), "/api/v1/predict", body).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["kind"], "input");
    }

    #[tokio::test]
    async fn test_malformed_body_gets_json_input_error() {
        let mut body = scenario();
        body["magnitude"] = json!("abc");
        let (status, payload, _) = post(router(), "/api/v1/predict", body).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let payload: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(payload["kind"], "input");
        assert!(payload["error"].as_str().unwrap().contains("magnitude"));
    }

    #[tokio::test]
    async fn test_numeric_bound_gets_json_input_error() {
        let mut body = scenario();
        body["lower_bound"] = json!(0.1);
        let (status, payload, _) = post(router(), "/api/v1/spectrum.png", body).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let payload: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(payload["kind"], "input");
    }

    #[tokio::test]
    async fn test_magnitude_above_slider_is_rejected() {
        let mut body = scenario();
        body["magnitude"] = json!(7.8);
        let (status, body, _) = post(router(), "/api/v1/predict", body).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["error"].as_str().unwrap().contains("magnitude"));
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_pipeline_error() {
        let app = router_with_output(vec![1.0; 10]);
        let (status, body, _) = post(app, "/api/v1/predict", scenario()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["kind"], "pipeline");
    }

    #[tokio::test]
    async fn test_csv_download() {
        let (status, body, disposition) = post(router(), "/api/v1/spectrum.csv", scenario()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            disposition.as_deref(),
            Some("attachment; filename=\"PSAs.csv\"")
        );
        let csv = String::from_utf8(body).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], ",PSAs,T");
        assert_eq!(lines.len(), 14);
        assert!(lines[1].starts_with("0,"));
        assert!(lines[1].ends_with(",0.03"));
        assert!(lines[13].ends_with(",2.0"));
    }

    #[tokio::test]
    async fn test_png_with_default_bounds() {
        let (status, body, _) = post(router(), "/api/v1/spectrum.png", scenario()).await;

        assert_eq!(status, StatusCode::OK);
        let img = image::load_from_memory(&body).unwrap();
        assert_eq!((img.width(), img.height()), (800, 200));
    }

    #[tokio::test]
    async fn test_bad_bound_is_recoverable() {
        let mut body = scenario();
        body["lower_bound"] = json!("abc");
        body["upper_bound"] = json!("100");
        let app = router();

        let (status, payload, _) = post(app.clone(), "/api/v1/spectrum.png", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let payload: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(payload["kind"], "input");

        // the same app keeps serving predictions
        let (status, _, _) = post(app, "/api/v1/predict", scenario()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_form_schema() {
        let request = Request::builder()
            .uri("/api/v1/form")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["sliders"]["magnitude"]["max"], 6.5);
        assert_eq!(body["mechanism"]["default"], "Strike-slip");
        assert_eq!(
            body["soil"]["options"],
            json!(["NEHRP D", "Generic soil", "NEHRP C"])
        );
        assert_eq!(body["chart_bounds"]["upper"], "100000");
    }

    #[tokio::test]
    async fn test_health_reports_model() {
        let request = Request::builder()
            .uri("/api/v1/health")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], "mock (15 outputs)");
    }
}
