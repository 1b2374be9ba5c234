//! Ownership and membership rules for photos, albums and profiles.
//!
//! Every operation takes the caller's [`Session`] and re-checks ownership
//! here, regardless of what a client or the HTTP layer already filtered.
//! Rows owned by someone else are reported exactly like rows that do not
//! exist.

mod albums;
pub mod membership;
mod photos;
mod profiles;
pub mod validation;

pub use albums::{AlbumChanges, NewAlbum};
pub use photos::{NewPhoto, PhotoChanges};
pub use profiles::{ProfileChanges, provision_user};

use crate::auth::Session;
use crate::blob::BlobStorage;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Album, Entity, Photo};

pub struct Library<'a> {
    store: &'a dyn Store,
    blobs: &'a BlobStorage,
    blob_base_url: &'a str,
}

impl<'a> Library<'a> {
    #[must_use]
    pub fn new(store: &'a dyn Store, blobs: &'a BlobStorage, blob_base_url: &'a str) -> Self {
        Self {
            store,
            blobs,
            blob_base_url,
        }
    }

    /// Loads a photo that `owner` owns, acting as `session`.
    fn owned_photo(&self, session: &Session, owner: &str, photo_id: &str) -> Result<Photo> {
        session.require_owner(owner)?;
        self.store
            .get_photo(photo_id)?
            .filter(|p| p.user_id == owner)
            .filter(|p| Entity::Photo.read_scope().allows(session.user_id(), &p.user_id))
            .ok_or(Error::Missing(Entity::Photo))
    }

    /// Loads an album that `owner` owns, acting as `session`.
    fn owned_album(&self, session: &Session, owner: &str, album_id: &str) -> Result<Album> {
        session.require_owner(owner)?;
        self.store
            .get_album(album_id)?
            .filter(|a| a.user_id == owner)
            .filter(|a| Entity::Album.read_scope().allows(session.user_id(), &a.user_id))
            .ok_or(Error::Missing(Entity::Album))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use tempfile::TempDir;

    use super::*;
    use crate::blob::BlobKey;
    use crate::store::SqliteStore;

    pub const BASE_URL: &str = "http://photos.test";

    pub struct Fixture {
        _temp: TempDir,
        pub store: SqliteStore,
        pub blobs: BlobStorage,
    }

    impl Fixture {
        pub fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
            store.initialize().unwrap();
            let blobs = BlobStorage::new(temp.path());
            Self {
                _temp: temp,
                store,
                blobs,
            }
        }

        pub fn library(&self) -> Library<'_> {
            Library::new(&self.store, &self.blobs, BASE_URL)
        }

        pub fn user(&self, email: &str) -> Session {
            let provisioned = self.store.provision_user(email).unwrap();
            Session::new(provisioned.user.id)
        }

        pub async fn upload(&self, session: &Session, filename: &str) -> String {
            let key = BlobKey::new(session.user_id(), filename).unwrap();
            self.blobs
                .put(session.user_id(), &key, b"fake image bytes")
                .await
                .unwrap();
            key.to_string()
        }

        pub async fn photo(&self, session: &Session, filename: &str) -> Photo {
            let key = self.upload(session, filename).await;
            self.library()
                .create_photo(session, session.user_id(), NewPhoto::new(key))
                .await
                .unwrap()
        }
    }
}
