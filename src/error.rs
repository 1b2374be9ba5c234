use thiserror::Error;

use crate::blob::BlobStorageError;
use crate::types::Entity;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found")]
    NotFound,

    /// A row that is absent or not visible to the caller.
    #[error("{} not found", .0.label())]
    Missing(Entity),

    #[error("token lookup collision")]
    TokenLookupCollision,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The session does not match the owner an operation is scoped to.
    #[error("unauthorized")]
    Unauthorized,

    /// The caller owns the parent row but referenced a row owned by someone else.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid token format")]
    InvalidTokenFormat,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] BlobStorageError),
}

pub type Result<T> = std::result::Result<T, Error>;
