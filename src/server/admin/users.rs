use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Duration;

use crate::auth::{RequireAdmin, TokenGenerator};
use crate::library::provision_user;
use crate::server::AppState;
use crate::server::dto::{
    CreateTokenResponse, CreateUserRequest, CreateUserResponse, CreateUserTokenRequest,
    TokenResponse,
};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};
use crate::types::{User, now};

fn find_user(state: &AppState, id: &str) -> Result<User, ApiError> {
    state.store.get_user(id)?.or_not_found("User not found")
}

/// Provisions a user and profile. Repeating the call for the same email
/// returns the existing pair with 200 instead of 201.
pub async fn create_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let provisioned = provision_user(state.store.as_ref(), &req.email)?;

    let status = if provisioned.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(ApiResponse::success(CreateUserResponse {
            user: provisioned.user,
            profile: provisioned.profile,
            created: provisioned.created,
        })),
    ))
}

pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.store.list_users()?;
    Ok(Json(ApiResponse::success(users)))
}

pub async fn get_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = find_user(&state, &id)?;
    Ok(Json(ApiResponse::success(user)))
}

/// Deletes the user along with their profile, tokens, photos and albums.
pub async fn delete_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = find_user(&state, &id)?;

    state.store.delete_user(&user.id)?;
    tracing::info!(user_id = %user.id, "Deleted user");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_user_tokens(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = find_user(&state, &id)?;

    let tokens: Vec<TokenResponse> = state
        .store
        .list_user_tokens(&user.id)?
        .into_iter()
        .map(TokenResponse::from)
        .collect();

    Ok(Json(ApiResponse::success(tokens)))
}

pub async fn create_user_token(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateUserTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = find_user(&state, &id)?;

    if let Some(seconds) = req.expires_in_seconds {
        if seconds < 0 {
            return Err(ApiError::bad_request(
                "expires_in_seconds cannot be negative",
            ));
        }
    }

    let expires_at = match req.expires_in_seconds {
        Some(seconds) => Some(
            Duration::try_seconds(seconds)
                .and_then(|d| now().checked_add_signed(d))
                .ok_or_else(|| ApiError::bad_request("expires_in_seconds is too large"))?,
        ),
        None => None,
    };

    let (token, raw) = TokenGenerator::new().issue(state.store.as_ref(), Some(&user.id), expires_at)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreateTokenResponse {
            token: raw,
            metadata: token.into(),
        })),
    ))
}
