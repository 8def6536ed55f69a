use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid slide deck: {0}")]
    InvalidDeck(String),

    #[error("PDF generation failed: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::Validation(format!("Malformed multipart body: {}", err.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidDeck(msg) => {
                tracing::error!("Export rejected: {msg}");
                (
                    StatusCode::BAD_REQUEST,
                    "PDF generation failed",
                    format!("Invalid slide deck: {msg}"),
                )
            }
            AppError::Render(e) => {
                tracing::error!("Error generating PDF: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PDF generation failed",
                    e.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_maps_to_bad_request() {
        let response = AppError::Validation("client_name is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "client_name is required");
    }

    #[tokio::test]
    async fn test_internal_hides_cause() {
        let response = AppError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal Server Error");
        assert!(!body["message"].as_str().unwrap().contains("secret"));
    }

    #[tokio::test]
    async fn test_render_error_carries_message() {
        let err = RenderError::InvalidSlide {
            key: "slide1".into(),
            reason: "expected an object".into(),
        };
        let response = AppError::Render(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "PDF generation failed");
        assert!(body["message"].as_str().unwrap().contains("slide1"));
    }
}
