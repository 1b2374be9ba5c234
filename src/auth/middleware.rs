use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, header::WWW_AUTHENTICATE, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::Session;
use super::helpers::{
    TokenValidationError, ValidatedToken, extract_token_from_header, validate_token,
};
use crate::server::AppState;
use crate::types::{Token, User};

/// Extractor that requires admin authentication
pub struct RequireAdmin(pub Token);

/// Extractor that requires user authentication (non-admin token with user_id)
pub struct RequireUser {
    pub token: Token,
    pub user: User,
    pub session: Session,
}

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    NotAdmin,
    NotUser,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
            AuthError::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
            AuthError::NotUser => (
                StatusCode::FORBIDDEN,
                "User token required for this operation",
            ),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"photoshelf\""),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_and_validate_token(parts, state)?.token;

        if !token.is_admin {
            return Err(AuthError::NotAdmin);
        }

        Ok(RequireAdmin(token))
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let ValidatedToken { token, user } = extract_and_validate_token(parts, state)?;

        if token.is_admin {
            return Err(AuthError::NotUser);
        }

        // A token whose user was deleted resolves to no user.
        let user = user.ok_or(AuthError::NotUser)?;

        let session = Session::new(user.id.clone());

        Ok(RequireUser {
            token,
            user,
            session,
        })
    }
}

fn extract_and_validate_token(
    parts: &Parts,
    state: &Arc<AppState>,
) -> Result<ValidatedToken, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let raw_token = extract_token_from_header(auth_header)
        .map_err(|e| match e {
            TokenValidationError::InvalidScheme => AuthError::InvalidScheme,
            TokenValidationError::InvalidToken => AuthError::InvalidToken,
            _ => AuthError::InternalError,
        })?
        .ok_or(AuthError::MissingAuth)?;

    validate_token(state.store.as_ref(), &raw_token, true).map_err(|e| match e {
        TokenValidationError::InvalidScheme => AuthError::InvalidScheme,
        TokenValidationError::InvalidToken => AuthError::InvalidToken,
        TokenValidationError::TokenExpired => AuthError::TokenExpired,
        TokenValidationError::AdminTokenNotAllowed => AuthError::NotAdmin,
        TokenValidationError::InternalError => AuthError::InternalError,
    })
}
