use std::fmt;
use std::str::FromStr;

use super::BlobStorageError;

const MAX_FILENAME_LEN: usize = 255;
const MAX_OWNER_LEN: usize = 64;

/// Object key in the blob store: `{owner_id}/{filename}`.
///
/// The first segment is the only thing the store looks at when deciding who
/// may write an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey {
    owner_id: String,
    filename: String,
}

impl BlobKey {
    pub fn new(owner_id: &str, filename: &str) -> Result<Self, BlobStorageError> {
        validate_owner(owner_id)?;
        validate_filename(filename)?;
        Ok(Self {
            owner_id: owner_id.to_string(),
            filename: filename.to_string(),
        })
    }

    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Best-effort content type from the file extension.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        let ext = self
            .filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("heic") => "image/heic",
            Some("avif") => "image/avif",
            _ => "application/octet-stream",
        }
    }
}

impl FromStr for BlobKey {
    type Err = BlobStorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (owner, filename) = s.split_once('/').ok_or(BlobStorageError::InvalidKey)?;
        Self::new(owner, filename)
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner_id, self.filename)
    }
}

fn validate_owner(owner: &str) -> Result<(), BlobStorageError> {
    if owner.is_empty()
        || owner.len() > MAX_OWNER_LEN
        || !owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(BlobStorageError::InvalidKey);
    }
    Ok(())
}

fn validate_filename(filename: &str) -> Result<(), BlobStorageError> {
    if filename.is_empty() || filename.len() > MAX_FILENAME_LEN || filename.starts_with('.') {
        return Err(BlobStorageError::InvalidKey);
    }
    if !filename
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(BlobStorageError::InvalidKey);
    }
    Ok(())
}
