use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{CreatePhotoRequest, UpdatePhotoRequest};
use crate::server::response::{ApiError, ApiResponse};

pub async fn list_photos(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let photos = state.library().list_photos(&auth.session, &auth.user.id)?;
    Ok(Json(ApiResponse::success(photos)))
}

/// Registers an uploaded blob as a photo.
pub async fn create_photo(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePhotoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let photo = state
        .library()
        .create_photo(&auth.session, &auth.user.id, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(photo))))
}

pub async fn get_photo(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let photo = state.library().get_photo(&auth.session, &auth.user.id, &id)?;
    Ok(Json(ApiResponse::success(photo)))
}

pub async fn update_photo(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePhotoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let photo = state
        .library()
        .update_photo(&auth.session, &auth.user.id, &id, req.into())?;
    Ok(Json(ApiResponse::success(photo)))
}

pub async fn delete_photo(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.library().delete_photo(&auth.session, &auth.user.id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
