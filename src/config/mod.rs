mod server;

pub use server::{DEFAULT_MAX_UPLOAD_BYTES, ServerConfig, ServerConfigFile};
