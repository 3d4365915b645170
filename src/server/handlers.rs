//! HTTP request handlers

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::inference::{validate_request, FieldViolation, Prediction};

use super::error::{Result, ServerError};
use super::state::AppState;

// ============================================================================
// Status Handlers
// ============================================================================

pub async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": "Iris Classification API is running!",
        "status": "healthy",
        "model_loaded": state.is_ready(),
    }))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    if !state.is_ready() {
        return Err(ServerError::Unavailable);
    }
    Ok(Json(json!({ "status": "healthy" })))
}

// ============================================================================
// Inference Handlers
// ============================================================================

/// Whether a `Content-Type` value names JSON (`application/json` or `*/*+json`)
fn is_json_content_type(value: &str) -> bool {
    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Decode the request body as JSON.
///
/// A missing `Content-Type` is read as JSON; any other non-JSON type is refused.
fn parse_json_body(headers: &HeaderMap, body: &Bytes) -> Result<Value> {
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        let is_json = content_type.to_str().map(is_json_content_type).unwrap_or(false);
        if !is_json {
            return Err(ServerError::Validation(vec![FieldViolation::body(
                "Expected request with `Content-Type: application/json`",
            )]));
        }
    }

    serde_json::from_slice(body).map_err(|e| {
        ServerError::Validation(vec![FieldViolation::body(format!("Invalid JSON body: {}", e))])
    })
}

/// Classify one sample.
///
/// The body is validated before the model is consulted, so a malformed request
/// gets 422 whether or not a model is loaded.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Prediction>> {
    let body = parse_json_body(&headers, &body)?;
    let sample = validate_request(&body).map_err(ServerError::Validation)?;

    let predictor = state.predictor().ok_or(ServerError::Unavailable)?;
    let prediction = predictor.predict(&sample)?;

    info!(
        prediction = prediction.prediction,
        class_name = %prediction.class_name,
        confidence = prediction.confidence,
        "Prediction served"
    );
    Ok(Json(prediction))
}
