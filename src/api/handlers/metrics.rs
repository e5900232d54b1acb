use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;

use crate::AppState;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4";

/// GET /metrics — Prometheus scrape of the prediction counters
/// (`predictions_total`, `predictions_failed`, `high_risk_total`), the
/// `ensemble_loaded` gauge, and the `predict_latency_seconds` histogram.
pub async fn render(State(state): State<AppState>) -> impl IntoResponse {
    let scrape = state.metrics_handle.render();
    ([(CONTENT_TYPE, PROMETHEUS_TEXT)], scrape)
}
