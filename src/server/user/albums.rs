use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{CreateAlbumRequest, UpdateAlbumRequest};
use crate::server::response::{ApiError, ApiResponse};

pub async fn list_albums(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let albums = state.library().list_albums(&auth.session, &auth.user.id)?;
    Ok(Json(ApiResponse::success(albums)))
}

pub async fn create_album(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAlbumRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let album = state
        .library()
        .create_album(&auth.session, &auth.user.id, req.into())?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(album))))
}

pub async fn get_album(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let album = state.library().get_album(&auth.session, &auth.user.id, &id)?;
    Ok(Json(ApiResponse::success(album)))
}

pub async fn update_album(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAlbumRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let album = state
        .library()
        .update_album(&auth.session, &auth.user.id, &id, req.into())?;
    Ok(Json(ApiResponse::success(album)))
}

pub async fn delete_album(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.library().delete_album(&auth.session, &auth.user.id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
