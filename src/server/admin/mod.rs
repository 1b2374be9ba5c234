mod tokens;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::server::AppState;

pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        // User routes
        .route("/users", post(users::create_user))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", delete(users::delete_user))
        .route("/users/{id}/tokens", get(users::list_user_tokens))
        .route("/users/{id}/tokens", post(users::create_user_token))
        // Token routes
        .route("/tokens/{id}", delete(tokens::delete_token))
}
