use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::response::{ApiError, StoreOptionExt};

pub async fn delete_token(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .store
        .get_token_by_id(&id)?
        .or_not_found("Token not found")?;

    if token.id == admin.0.id {
        return Err(ApiError::bad_request("Cannot delete current token"));
    }

    state.store.delete_token(&token.id)?;

    Ok(StatusCode::NO_CONTENT)
}
