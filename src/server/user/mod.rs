mod album_photos;
mod albums;
mod photos;
mod profiles;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::server::AppState;
use crate::server::blobs;

/// Routes acting on the caller's own data. Every handler passes the caller's
/// session and id to the library, which re-checks ownership.
pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        // Profiles
        .route("/profile", get(profiles::get_my_profile))
        .route("/profile", patch(profiles::update_profile))
        .route("/profiles/{user_id}", get(profiles::get_profile))
        // Blob upload
        .route("/blobs/{owner}/{filename}", put(blobs::upload))
        // Photos
        .route("/photos", get(photos::list_photos))
        .route("/photos", post(photos::create_photo))
        .route("/photos/{id}", get(photos::get_photo))
        .route("/photos/{id}", patch(photos::update_photo))
        .route("/photos/{id}", delete(photos::delete_photo))
        // Albums
        .route("/albums", get(albums::list_albums))
        .route("/albums", post(albums::create_album))
        .route("/albums/{id}", get(albums::get_album))
        .route("/albums/{id}", patch(albums::update_album))
        .route("/albums/{id}", delete(albums::delete_album))
        // Album photos (many-to-many)
        .route("/albums/{id}/photos", get(album_photos::list_album_photos))
        .route("/albums/{id}/photos", post(album_photos::add_album_photos))
        .route(
            "/albums/{id}/photos/{photo_id}",
            delete(album_photos::remove_album_photo),
        )
        .route(
            "/albums/{id}/available-photos",
            get(album_photos::list_available_photos),
        )
}
