mod key;
mod storage;

pub use key::BlobKey;
pub use storage::{BlobStorage, BlobStorageError, StoredBlob};
