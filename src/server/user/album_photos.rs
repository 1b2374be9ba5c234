use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{AlbumPhotosRequest, AlbumPhotosResponse};
use crate::server::response::{ApiError, ApiResponse};

pub async fn list_album_photos(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let photos = state
        .library()
        .list_album_photos(&auth.session, &auth.user.id, &id)?;
    Ok(Json(ApiResponse::success(photos)))
}

/// Photo ids already in the album are ignored; the response counts only new
/// memberships.
pub async fn add_album_photos(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AlbumPhotosRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let added = state
        .library()
        .add_photos_to_album(&auth.session, &auth.user.id, &id, &req.photo_ids)?;
    Ok(Json(ApiResponse::success(AlbumPhotosResponse { added })))
}

pub async fn remove_album_photo(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path((id, photo_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .library()
        .remove_photo_from_album(&auth.session, &auth.user.id, &id, &photo_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_available_photos(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let photos = state
        .library()
        .list_available_photos(&auth.session, &auth.user.id, &id)?;
    Ok(Json(ApiResponse::success(photos)))
}
