use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::blob::BlobStorageError;
use crate::error::Error;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

/// API error that converts to a proper HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, "Unauthorized"),
            Error::Forbidden(message) => Self::new(StatusCode::FORBIDDEN, message),
            Error::NotFound => Self::not_found("Not found"),
            Error::Missing(entity) => {
                Self::not_found(capitalize(&format!("{} not found", entity.label())))
            }
            Error::Validation(message) => Self::bad_request(message),
            Error::InvalidTokenFormat => Self::bad_request("Invalid token format"),
            Error::Conflict(message) => Self::new(StatusCode::CONFLICT, message),
            Error::Storage(BlobStorageError::NotFound) => Self::not_found("Blob not found"),
            Error::Storage(BlobStorageError::InvalidKey) => Self::bad_request("Invalid blob key"),
            Error::Storage(BlobStorageError::PrefixMismatch) => Self::new(
                StatusCode::FORBIDDEN,
                "Blobs can only be written under your own user id",
            ),
            e => {
                tracing::error!("request failed: {e}");
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<BlobStorageError> for ApiError {
    fn from(e: BlobStorageError) -> Self {
        Error::Storage(e).into()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "data": null, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

/// Extension for Option types from store operations.
pub trait StoreOptionExt<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreOptionExt<T> for Option<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}
