use std::sync::Arc;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio_util::io::ReaderStream;

use crate::auth::RequireUser;
use crate::blob::BlobKey;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse};

/// Unauthenticated blob reads. Anyone holding a photo URL can fetch the bytes.
pub fn public_blob_router() -> Router<Arc<AppState>> {
    Router::new().route("/blobs/{owner}/{filename}", get(download))
}

pub async fn download(
    State(state): State<Arc<AppState>>,
    Path((owner, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let key = BlobKey::new(&owner, &filename)?;
    let (reader, size) = state.blobs.get(&key).await?;

    let body = Body::from_stream(ReaderStream::new(reader));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, key.content_type())
        .header(header::CONTENT_LENGTH, size)
        .header("X-Content-Type-Options", "nosniff")
        .body(body)
        .map_err(|e| ApiError::internal(format!("Failed to build response: {e}")))
}

/// Stores the request body under `{owner}/{filename}`. The blob store only
/// accepts writes where `owner` is the caller.
pub async fn upload(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path((owner, filename)): Path<(String, String)>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let key = BlobKey::new(&owner, &filename)?;

    if body.is_empty() {
        return Err(ApiError::bad_request("Blob body cannot be empty"));
    }

    let stored = state.blobs.put(auth.session.user_id(), &key, &body).await?;
    tracing::info!(key = %stored.key, size = stored.size, "Stored blob");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(stored))))
}
