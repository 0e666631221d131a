use axum::{http::StatusCode, response::Json};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

use crate::store::StoreError;

pub const VALIDATION_ERRORS: &str = "validation errors";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Validation errors")]
    Validation,
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Body of a 404 or 500 response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    pub error: String,
}

/// Body of a 400 response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub errors: Vec<String>,
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(_) | StoreError::MissingReference(_) => ApiError::Validation,
            other => {
                error!(error = %other, "store failure");
                ApiError::InternalError(other.to_string())
            }
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Validation => (
                StatusCode::BAD_REQUEST,
                json!({ "errors": [VALIDATION_ERRORS] }),
            ),
            ApiError::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;
    use crate::models::ValidationError;

    async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let (status, body) = body_of(ApiError::NotFound("Restaurant not found")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Restaurant not found"}));
    }

    #[tokio::test]
    async fn test_validation_body() {
        let (status, body) = body_of(ApiError::Validation).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"errors": ["validation errors"]}));
    }

    #[test]
    fn test_store_errors_map_to_api_errors() {
        assert!(matches!(
            ApiError::from(StoreError::Validation(ValidationError::PriceOutOfRange(50))),
            ApiError::Validation
        ));
        assert!(matches!(
            ApiError::from(StoreError::MissingReference("pizza")),
            ApiError::Validation
        ));
        assert!(matches!(
            ApiError::from(StoreError::Migration("boom".to_string())),
            ApiError::InternalError(_)
        ));
    }
}
