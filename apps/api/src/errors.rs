use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::interview::profile::ValidationError;
use crate::interview::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid profile field: {0}")]
    InvalidField(ValidationError),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Validation(v) => AppError::InvalidField(v),
            SessionError::EmptyAnswer => AppError::Validation(e.to_string()),
            SessionError::WrongPhase { .. } => AppError::Conflict(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::InvalidField(v) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                v.to_string(),
                Some(v.field),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(field) = field {
            error["field"] = json!(field);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::profile::ProfileField;
    use crate::interview::session::Phase;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_field_names_the_field() {
        let err = AppError::from(SessionError::Validation(ValidationError {
            field: ProfileField::Phone,
            reason: "is required",
        }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["field"], "phone");
        assert_eq!(body["error"]["message"], "phone: is required");
    }

    #[tokio::test]
    async fn test_wrong_phase_is_conflict() {
        let err = AppError::from(SessionError::WrongPhase {
            action: "answer",
            phase: Phase::Completed,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert!(body["error"].get("field").is_none());
    }

    #[test]
    fn test_empty_answer_is_bad_request() {
        let response = AppError::from(SessionError::EmptyAnswer).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
