use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Public base URL for external access (e.g., "https://photos.example.com").
    /// Prefixed onto blob keys to build the url stored on each photo.
    pub public_base_url: Option<String>,
    pub max_upload_bytes: usize,
}

/// Optional on-disk overrides, read from a TOML file passed with `--config`.
/// Every field is optional; unset fields keep the value from the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfigFile {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub public_base_url: Option<String>,
    pub max_upload_bytes: Option<usize>,
}

impl ServerConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("photoshelf.db")
    }

    /// Base that photo URLs are built from. Falls back to the bind address.
    #[must_use]
    pub fn blob_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }

    #[must_use]
    pub fn with_file(mut self, file: ServerConfigFile) -> Self {
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(data_dir) = file.data_dir {
            self.data_dir = data_dir;
        }
        if file.public_base_url.is_some() {
            self.public_base_url = file.public_base_url;
        }
        if let Some(max) = file.max_upload_bytes {
            self.max_upload_bytes = max;
        }
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            public_base_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
