use uuid::Uuid;

use super::Library;
use super::validation::normalize_text;
use crate::auth::Session;
use crate::blob::{BlobKey, BlobStorageError};
use crate::error::{Error, Result};
use crate::types::{Entity, Photo, now};

/// Fields for a new photo. `blob_key` must name an already uploaded object.
#[derive(Debug, Clone, Default)]
pub struct NewPhoto {
    pub blob_key: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl NewPhoto {
    #[must_use]
    pub fn new(blob_key: impl Into<String>) -> Self {
        Self {
            blob_key: blob_key.into(),
            ..Self::default()
        }
    }
}

/// Partial update; `None` leaves a field as is, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct PhotoChanges {
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

impl Library<'_> {
    pub async fn create_photo(
        &self,
        session: &Session,
        owner: &str,
        new: NewPhoto,
    ) -> Result<Photo> {
        session.require_owner(owner)?;

        let key: BlobKey = new
            .blob_key
            .parse()
            .map_err(|_| Error::Validation(format!("Invalid blob key: {}", new.blob_key)))?;
        if key.owner_id() != owner {
            return Err(Error::Forbidden(
                "Blob key must start with your user id".to_string(),
            ));
        }
        if !self.blobs.exists(&key).await? {
            return Err(BlobStorageError::NotFound.into());
        }

        let photo = Photo {
            id: Uuid::new_v4().to_string(),
            user_id: owner.to_string(),
            url: format!("{}/blobs/{key}", self.blob_base_url),
            storage_key: key.to_string(),
            title: normalize_text("Title", new.title)?,
            description: normalize_text("Description", new.description)?,
            created_at: now(),
        };
        self.store.create_photo(&photo)?;

        tracing::info!(photo_id = %photo.id, user_id = %owner, "Created photo");
        Ok(photo)
    }

    pub fn get_photo(&self, session: &Session, owner: &str, photo_id: &str) -> Result<Photo> {
        self.owned_photo(session, owner, photo_id)
    }

    /// Newest first.
    pub fn list_photos(&self, session: &Session, owner: &str) -> Result<Vec<Photo>> {
        session.require_owner(owner)?;
        self.store.list_photos(owner)
    }

    pub fn update_photo(
        &self,
        session: &Session,
        owner: &str,
        photo_id: &str,
        changes: PhotoChanges,
    ) -> Result<Photo> {
        let mut photo = self.owned_photo(session, owner, photo_id)?;

        if let Some(title) = changes.title {
            photo.title = normalize_text("Title", title)?;
        }
        if let Some(description) = changes.description {
            photo.description = normalize_text("Description", description)?;
        }

        self.store.update_photo(&photo).map_err(|e| match e {
            Error::NotFound => Error::Missing(Entity::Photo),
            e => e,
        })?;
        Ok(photo)
    }

    /// Removes the photo row. Memberships go with it and any album using it as
    /// cover falls back to its newest member. The blob is left in place.
    pub fn delete_photo(&self, session: &Session, owner: &str, photo_id: &str) -> Result<()> {
        let photo = self.owned_photo(session, owner, photo_id)?;

        if !self.store.delete_photo(&photo.id)? {
            return Err(Error::Missing(Entity::Photo));
        }

        tracing::info!(photo_id = %photo.id, user_id = %owner, "Deleted photo");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::test_support::{BASE_URL, Fixture};
    use crate::library::NewAlbum;
    use crate::store::Store;

    #[tokio::test]
    async fn test_create_photo_requires_uploaded_blob() {
        let fx = Fixture::new();
        let alice = fx.user("alice@example.com");
        let owner = alice.user_id().to_string();

        let missing = fx
            .library()
            .create_photo(&alice, &owner, NewPhoto::new(format!("{owner}/nope.jpg")))
            .await;
        assert!(matches!(
            missing,
            Err(Error::Storage(BlobStorageError::NotFound))
        ));

        let key = fx.upload(&alice, "cat.jpg").await;
        let photo = fx
            .library()
            .create_photo(
                &alice,
                &owner,
                NewPhoto {
                    blob_key: key.clone(),
                    title: Some("  Cat ".to_string()),
                    description: Some("   ".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(photo.user_id, owner);
        assert_eq!(photo.storage_key, key);
        assert_eq!(photo.url, format!("{BASE_URL}/blobs/{key}"));
        assert_eq!(photo.title.as_deref(), Some("Cat"));
        assert_eq!(photo.description, None);
    }

    #[tokio::test]
    async fn test_create_photo_rejects_other_owner() {
        let fx = Fixture::new();
        let alice = fx.user("alice@example.com");
        let bob = fx.user("bob@example.com");
        let key = fx.upload(&alice, "cat.jpg").await;

        // Bob acting as Alice.
        let result = fx
            .library()
            .create_photo(&bob, alice.user_id(), NewPhoto::new(key.clone()))
            .await;
        assert!(matches!(result, Err(Error::Unauthorized)));

        // Bob referencing Alice's blob as his own photo.
        let result = fx
            .library()
            .create_photo(&bob, bob.user_id(), NewPhoto::new(key))
            .await;
        assert!(matches!(result, Err(Error::Forbidden(_))));

        let result = fx
            .library()
            .create_photo(&bob, bob.user_id(), NewPhoto::new("not a key"))
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_photos_are_private() {
        let fx = Fixture::new();
        let alice = fx.user("alice@example.com");
        let bob = fx.user("bob@example.com");
        let photo = fx.photo(&alice, "cat.jpg").await;
        let lib = fx.library();

        assert!(matches!(
            lib.get_photo(&bob, alice.user_id(), &photo.id),
            Err(Error::Unauthorized)
        ));
        assert!(matches!(
            lib.get_photo(&bob, bob.user_id(), &photo.id),
            Err(Error::Missing(Entity::Photo))
        ));
        assert!(matches!(
            lib.delete_photo(&bob, bob.user_id(), &photo.id),
            Err(Error::Missing(Entity::Photo))
        ));
        assert!(lib.list_photos(&bob, bob.user_id()).unwrap().is_empty());
        assert_eq!(lib.get_photo(&alice, alice.user_id(), &photo.id).unwrap(), photo);
    }

    #[tokio::test]
    async fn test_list_photos_newest_first() {
        let fx = Fixture::new();
        let alice = fx.user("alice@example.com");
        let first = fx.photo(&alice, "a.jpg").await;
        let second = fx.photo(&alice, "b.jpg").await;

        let listed = fx.library().list_photos(&alice, alice.user_id()).unwrap();
        assert_eq!(listed, vec![second, first]);
    }

    #[tokio::test]
    async fn test_update_photo_sets_and_clears_fields() {
        let fx = Fixture::new();
        let alice = fx.user("alice@example.com");
        let photo = fx.photo(&alice, "cat.jpg").await;
        let lib = fx.library();

        let updated = lib
            .update_photo(
                &alice,
                alice.user_id(),
                &photo.id,
                PhotoChanges {
                    title: Some(Some("Cat".to_string())),
                    description: Some(Some("On the sofa".to_string())),
                },
            )
            .unwrap();
        assert_eq!(updated.title.as_deref(), Some("Cat"));

        let cleared = lib
            .update_photo(
                &alice,
                alice.user_id(),
                &photo.id,
                PhotoChanges {
                    title: Some(None),
                    description: None,
                },
            )
            .unwrap();
        assert_eq!(cleared.title, None);
        assert_eq!(cleared.description.as_deref(), Some("On the sofa"));
        assert_eq!(lib.get_photo(&alice, alice.user_id(), &photo.id).unwrap(), cleared);
    }

    #[tokio::test]
    async fn test_delete_photo_removes_memberships_and_repeat_is_not_found() {
        let fx = Fixture::new();
        let alice = fx.user("alice@example.com");
        let owner = alice.user_id().to_string();
        let lib = fx.library();

        let p1 = fx.photo(&alice, "p1.jpg").await;
        let p2 = fx.photo(&alice, "p2.jpg").await;
        let a1 = lib.create_album(&alice, &owner, NewAlbum::new("One")).unwrap();
        let a2 = lib.create_album(&alice, &owner, NewAlbum::new("Two")).unwrap();
        for album in [&a1, &a2] {
            lib.add_photos_to_album(&alice, &owner, &album.id, &[p1.id.clone(), p2.id.clone()])
                .unwrap();
        }

        lib.delete_photo(&alice, &owner, &p1.id).unwrap();

        for album in [&a1, &a2] {
            let members = lib.list_album_photos(&alice, &owner, &album.id).unwrap();
            assert_eq!(members, vec![p2.clone()]);
        }
        assert_eq!(lib.list_photos(&alice, &owner).unwrap(), vec![p2.clone()]);
        assert!(matches!(
            lib.delete_photo(&alice, &owner, &p1.id),
            Err(Error::Missing(Entity::Photo))
        ));

        // The blob stays behind.
        let key = p1.storage_key.parse().unwrap();
        assert!(fx.blobs.exists(&key).await.unwrap());
        assert_eq!(fx.store.list_album_memberships(&a1.id).unwrap().len(), 1);
    }
}
