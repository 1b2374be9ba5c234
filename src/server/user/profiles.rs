use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::UpdateProfileRequest;
use crate::server::response::{ApiError, ApiResponse};

pub async fn get_my_profile(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.library().get_my_profile(&auth.session)?;
    Ok(Json(ApiResponse::success(profile)))
}

pub async fn get_profile(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.library().get_profile(&auth.session, &user_id)?;
    Ok(Json(ApiResponse::success(profile)))
}

pub async fn update_profile(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .library()
        .update_profile(&auth.session, &auth.user.id, req.into())?;
    Ok(Json(ApiResponse::success(profile)))
}
