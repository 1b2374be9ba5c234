#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use photoshelf::auth::TokenGenerator;
use photoshelf::config::ServerConfig;
use photoshelf::server::{AppState, create_router};
use photoshelf::store::{SqliteStore, Store};

pub const BASE_URL: &str = "http://photos.test";
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// The full router over a fresh data directory, driven in-process.
pub struct TestApp {
    pub temp_dir: TempDir,
    pub admin_token: String,
    router: Router,
}

pub struct TestUser {
    pub id: String,
    pub token: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        if self.body.is_empty() {
            return Value::Null;
        }
        serde_json::from_slice(&self.body).expect("response is not JSON")
    }

    pub fn data(&self) -> Value {
        self.json()["data"].clone()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            data_dir: temp_dir.path().to_path_buf(),
            public_base_url: Some(format!("{BASE_URL}/")),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        };

        let store = SqliteStore::new(config.db_path()).expect("open store");
        store.initialize().expect("initialize store");

        let (_, admin_token) = TokenGenerator::new()
            .issue(&store, None, None)
            .expect("issue admin token");

        let state = Arc::new(AppState::new(Arc::new(store), &config));

        Self {
            temp_dir,
            admin_token,
            router: create_router(state),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body")
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.send(request).await
    }

    pub async fn get(&self, path: &str, token: &str) -> TestResponse {
        self.call(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> TestResponse {
        self.call(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> TestResponse {
        self.call(Method::PATCH, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> TestResponse {
        self.call(Method::DELETE, path, Some(token), None).await
    }

    /// Provisions a user through the admin API and issues them a token.
    pub async fn create_user(&self, email: &str) -> TestUser {
        let resp = self
            .post(
                "/api/v1/admin/users",
                &self.admin_token,
                serde_json::json!({ "email": email }),
            )
            .await;
        assert!(resp.status.is_success(), "provision {email}: {}", resp.status);
        let id = resp.data()["user"]["id"].as_str().expect("user id").to_string();

        let resp = self
            .post(
                &format!("/api/v1/admin/users/{id}/tokens"),
                &self.admin_token,
                serde_json::json!({}),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
        let token = resp.data()["token"].as_str().expect("token").to_string();

        TestUser { id, token }
    }

    pub async fn upload(&self, user: &TestUser, key: &str, bytes: &[u8]) -> TestResponse {
        let request = Request::builder()
            .method(Method::PUT)
            .uri(format!("/api/v1/blobs/{key}"))
            .header(header::AUTHORIZATION, format!("Bearer {}", user.token))
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(Body::from(bytes.to_vec()))
            .expect("build request");
        self.send(request).await
    }

    /// Uploads a blob and registers it as a photo; returns the photo JSON.
    pub async fn create_photo(&self, user: &TestUser, filename: &str) -> Value {
        let key = format!("{}/{filename}", user.id);
        let resp = self.upload(user, &key, b"not really a jpeg").await;
        assert_eq!(resp.status, StatusCode::CREATED);

        let resp = self
            .post(
                "/api/v1/photos",
                &user.token,
                serde_json::json!({ "blob_key": key }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
        resp.data()
    }

    pub async fn create_album(&self, user: &TestUser, name: &str) -> String {
        let resp = self
            .post("/api/v1/albums", &user.token, serde_json::json!({ "name": name }))
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
        resp.data()["id"].as_str().expect("album id").to_string()
    }
}

pub fn id(value: &Value) -> String {
    value["id"].as_str().expect("id").to_string()
}

pub fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("array")
        .iter()
        .map(id)
        .collect()
}
