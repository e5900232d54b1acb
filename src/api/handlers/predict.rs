use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use metrics::{counter, histogram};

use crate::ensemble::score_consensus;
use crate::errors::AppError;
use crate::models::PredictResponse;
use crate::AppState;

/// POST /predict — score one feature map against the loaded ensemble.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, AppError> {
    let started = Instant::now();
    let result = run_prediction(&state, &body);
    histogram!("predict_latency_seconds").record(started.elapsed().as_secs_f64());

    match &result {
        Ok(Json(resp)) => {
            counter!("predictions_total").increment(1);
            if resp.prediction == 1 {
                counter!("high_risk_total").increment(1);
            }
        }
        Err(_) => {
            counter!("predictions_failed").increment(1);
        }
    }

    result
}

fn run_prediction(state: &AppState, body: &[u8]) -> Result<Json<PredictResponse>, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("No data".into()));
    }

    let value: serde_json::Value = serde_json::from_slice(body).map_err(anyhow::Error::from)?;
    let data = match &value {
        v if is_empty_payload(v) => {
            return Err(AppError::BadRequest("No data".into()));
        }
        serde_json::Value::Object(map) => map,
        _ => {
            return Err(AppError::Internal(anyhow::anyhow!(
                "request body must be a JSON object"
            )));
        }
    };

    let ensemble = state.ensemble.as_ref().ok_or(AppError::EnsembleUnavailable)?;

    let row = ensemble.feature_row(data);
    let outputs = ensemble.outputs(&row);
    let resp = score_consensus(
        &outputs,
        &ensemble.feature_names,
        &ensemble.feature_importances,
    );

    tracing::info!(
        prediction = resp.prediction,
        consensus = %resp.consensus,
        confidence = %resp.confidence,
        "Prediction served"
    );

    Ok(Json(resp))
}

/// "No data" covers every falsy payload, not just missing bodies: null, `{}`,
/// `[]`, `""`, `0`, and `false` all count as empty.
fn is_empty_payload(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
    }
}
