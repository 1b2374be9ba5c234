use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufReader};
use uuid::Uuid;

use super::BlobKey;

#[derive(Debug, Error)]
pub enum BlobStorageError {
    #[error("object not found")]
    NotFound,
    #[error("invalid object key")]
    InvalidKey,
    #[error("object key must start with the caller's id")]
    PrefixMismatch,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlobStorageError {
    fn from_io(e: std::io::Error) -> Self {
        if e.kind() == ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(e)
        }
    }
}

/// Metadata about an object after a successful write.
#[derive(Debug, Clone, Serialize)]
pub struct StoredBlob {
    pub key: String,
    pub size: u64,
    pub sha256: String,
}

/// Filesystem blob store. Writes are owner-prefixed; reads are open to anyone.
pub struct BlobStorage {
    base_path: PathBuf,
}

impl BlobStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_path: data_dir.join("blobs"),
        }
    }

    fn object_path(&self, key: &BlobKey) -> PathBuf {
        self.base_path.join(key.owner_id()).join(key.filename())
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path.join(".tmp").join(Uuid::new_v4().to_string())
    }

    fn check_prefix(caller_id: &str, key: &BlobKey) -> Result<(), BlobStorageError> {
        if key.owner_id() != caller_id {
            return Err(BlobStorageError::PrefixMismatch);
        }
        Ok(())
    }

    pub async fn exists(&self, key: &BlobKey) -> Result<bool, BlobStorageError> {
        Ok(fs::try_exists(self.object_path(key)).await?)
    }

    pub async fn get(&self, key: &BlobKey) -> Result<(BufReader<File>, u64), BlobStorageError> {
        let path = self.object_path(key);
        let file = File::open(&path).await.map_err(BlobStorageError::from_io)?;

        let metadata = file.metadata().await?;

        Ok((BufReader::new(file), metadata.len()))
    }

    async fn write_and_move(temp_path: &Path, final_path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut temp_file = File::create(temp_path).await?;
        temp_file.write_all(data).await?;
        temp_file.sync_all().await?;
        drop(temp_file);

        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::rename(temp_path, final_path).await
    }

    /// Writes `data` under `key`, replacing any existing object.
    /// `caller_id` must match the key's owner segment.
    pub async fn put(
        &self,
        caller_id: &str,
        key: &BlobKey,
        data: &[u8],
    ) -> Result<StoredBlob, BlobStorageError> {
        Self::check_prefix(caller_id, key)?;

        let mut hasher = Sha256::new();
        hasher.update(data);
        let sha256 = hex::encode(hasher.finalize());

        let temp_path = self.temp_path();
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let final_path = self.object_path(key);
        if let Err(e) = Self::write_and_move(&temp_path, &final_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(StoredBlob {
            key: key.to_string(),
            size: data.len() as u64,
            sha256,
        })
    }
}
