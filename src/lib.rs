//! # Photoshelf
//!
//! A self-hostable photo library: users upload photos, group them into albums
//! and keep a profile. Usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! photoshelf = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use photoshelf::config::ServerConfig;
//! use photoshelf::server::{AppState, create_router};
//! use photoshelf::store::{SqliteStore, Store};
//!
//! let config = ServerConfig { /* ... */ };
//! let store = SqliteStore::new(config.db_path()).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), &config));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! Ownership rules live in [`library`]; every operation there takes an
//! explicit [`auth::Session`].
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `photoshelf` binary. Disable with `default-features = false`.

pub mod auth;
pub mod blob;
pub mod config;
pub mod error;
pub mod library;
pub mod server;
pub mod store;
pub mod types;
