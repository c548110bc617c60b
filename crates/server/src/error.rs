use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::store::StoreError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("card not found")]
    CardNotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::CardNotFound | ApiError::Store(StoreError::NotFound) => {
                (StatusCode::NOT_FOUND, "Card not found".to_string())
            }
            ApiError::Store(StoreError::SlugTaken(slug)) => (
                StatusCode::CONFLICT,
                format!("The URL \"{slug}\" is already taken"),
            ),
            ApiError::Store(StoreError::Unavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Card store unavailable".to_string(),
            ),
            ApiError::Store(StoreError::Database(_)) | ApiError::Serialization(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
