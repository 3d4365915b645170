//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::ClassifierError;
use crate::inference::FieldViolation;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {} violation(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("Model not loaded")]
    Unavailable,

    #[error("Prediction error: {0}")]
    Inference(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl From<ClassifierError> for ServerError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::InferenceError(msg) => ServerError::Inference(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Inference(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, detail) = match &self {
            ServerError::Validation(violations) => (
                "Invalid request".to_string(),
                serde_json::to_value(violations).unwrap_or_default(),
            ),
            ServerError::Unavailable => ("Service unavailable".to_string(), json!("Model not loaded")),
            ServerError::Inference(msg) => {
                tracing::error!(detail = %msg, "Prediction error");
                ("Prediction failed. Check server logs for details.".to_string(), serde_json::Value::Null)
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                ("An internal error occurred".to_string(), serde_json::Value::Null)
            }
            ServerError::NotFound(msg) => (msg.clone(), serde_json::Value::Null),
            ServerError::MethodNotAllowed => (
                "Method not allowed. Supported: GET /, GET /health, POST /predict.".to_string(),
                serde_json::Value::Null,
            ),
        };

        let body = Json(json!({
            "error": true,
            "message": message,
            "detail": detail,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::ViolationKind;

    #[test]
    fn test_status_mapping() {
        let validation = ServerError::Validation(vec![FieldViolation::new(
            "sepal_length",
            ViolationKind::Negative,
            "must be >= 0",
        )]);
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ServerError::Unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ServerError::Inference("nan".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let err: ServerError = ClassifierError::ShapeError {
            expected: "4 features".to_string(),
            actual: "2 features".to_string(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "An internal error occurred");
        assert!(!body.to_string().contains("features"));
    }

    #[test]
    fn test_classifier_error_conversion() {
        let err: ServerError = ClassifierError::InferenceError("overflow".to_string()).into();
        assert!(matches!(err, ServerError::Inference(_)));

        let err: ServerError = ClassifierError::ModelNotFitted.into();
        assert!(matches!(err, ServerError::Internal(_)));
    }
}
