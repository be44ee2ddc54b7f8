use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::resume::pdf::ExtractionError;
use crate::session::tracker::TrackerError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey => AppError::Config(
                "The AI service is not configured. Set GEMINI_API_KEY and restart the server."
                    .to_string(),
            ),
            other => AppError::Llm(other),
        }
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::MissingFields => AppError::Validation(err.to_string()),
            TrackerError::NotFound(_) => AppError::NotFound(err.to_string()),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, bool) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), false),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), false)
            }
            AppError::Upload(e) => (e.status(), "UPLOAD_ERROR", e.body_text(), false),
            AppError::Extraction(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                format!("Could not read your resume: {e}."),
                false,
            ),
            AppError::Config(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "CONFIG_ERROR", msg.clone(), false)
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                llm_parts(e)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    false,
                )
            }
        }
    }
}

fn llm_parts(err: &LlmError) -> (StatusCode, &'static str, String, bool) {
    match err {
        LlmError::Network(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "LLM_UNAVAILABLE",
            "Could not reach the AI service. Please try again in a moment.".to_string(),
            true,
        ),
        LlmError::Http { status, .. } if (500..600).contains(status) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "LLM_UNAVAILABLE",
            format!("The AI service is temporarily unavailable (status {status}). Please try again."),
            true,
        ),
        LlmError::Http { status: 401 | 403, .. } => (
            StatusCode::BAD_GATEWAY,
            "LLM_REJECTED",
            "The AI service rejected the API key. Check GEMINI_API_KEY.".to_string(),
            false,
        ),
        LlmError::Http { status, .. } => (
            StatusCode::BAD_GATEWAY,
            "LLM_REJECTED",
            format!("The AI service rejected the request (status {status})."),
            false,
        ),
        LlmError::Decode { .. } => (
            StatusCode::BAD_GATEWAY,
            "LLM_BAD_REPLY",
            "The AI returned a reply that could not be read. Please try again.".to_string(),
            true,
        ),
        LlmError::MissingApiKey => (
            StatusCode::SERVICE_UNAVAILABLE,
            "CONFIG_ERROR",
            "The AI service is not configured.".to_string(),
            false,
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, retryable) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "retryable": retryable
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_becomes_config_error() {
        let err = AppError::from(LlmError::MissingApiKey);
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.parts().0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_exhausted_server_errors_are_retryable() {
        let err = AppError::from(LlmError::Http {
            status: 503,
            body: "overloaded".to_string(),
        });
        let (status, code, _, retryable) = err.parts();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "LLM_UNAVAILABLE");
        assert!(retryable);
    }

    #[test]
    fn test_bad_credential_points_at_key_and_hides_body() {
        let err = AppError::from(LlmError::Http {
            status: 401,
            body: "API key not valid".to_string(),
        });
        let (status, _, message, retryable) = err.parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(message.contains("GEMINI_API_KEY"));
        assert!(!message.contains("not valid"));
        assert!(!retryable);
    }

    #[test]
    fn test_decode_error_hides_raw_reply() {
        let err = AppError::from(LlmError::Decode {
            reason: "expected value".to_string(),
            raw: "SECRET-RAW".to_string(),
        });
        let (_, code, message, _) = err.parts();
        assert_eq!(code, "LLM_BAD_REPLY");
        assert!(!message.contains("SECRET-RAW"));
    }

    #[test]
    fn test_extraction_is_unprocessable() {
        let err = AppError::from(ExtractionError::NotPdf);
        assert_eq!(err.parts().0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_tracker_errors_map_to_validation_and_not_found() {
        assert!(matches!(
            AppError::from(TrackerError::MissingFields),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(TrackerError::NotFound(3)),
            AppError::NotFound(_)
        ));
    }
}
