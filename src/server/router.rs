use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::admin::admin_router;
use super::blobs::public_blob_router;
use super::user::user_router;
use crate::blob::BlobStorage;
use crate::config::ServerConfig;
use crate::library::Library;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub blobs: BlobStorage,
    /// Prefix for photo URLs, without a trailing slash.
    pub blob_base_url: String,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &ServerConfig) -> Self {
        Self {
            store,
            blobs: BlobStorage::new(&config.data_dir),
            blob_base_url: config.blob_base_url(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    #[must_use]
    pub fn library(&self) -> Library<'_> {
        Library::new(self.store.as_ref(), &self.blobs, &self.blob_base_url)
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(health))
        .merge(public_blob_router())
        .nest("/api/v1/admin", admin_router())
        .nest("/api/v1", user_router())
        .layer(body_limit)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
