use uuid::Uuid;

use super::Library;
use super::membership::{available_photos, dedupe_ids, resolve_cover};
use super::validation::{normalize_text, validate_album_name};
use crate::auth::Session;
use crate::error::{Error, Result};
use crate::types::{Album, AlbumSummary, Entity, Photo, now};

#[derive(Debug, Clone, Default)]
pub struct NewAlbum {
    pub name: String,
    pub description: Option<String>,
}

impl NewAlbum {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Partial update; `None` leaves a field as is, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct AlbumChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub cover_photo_id: Option<Option<String>>,
}

impl Library<'_> {
    pub fn create_album(&self, session: &Session, owner: &str, new: NewAlbum) -> Result<Album> {
        session.require_owner(owner)?;

        let now = now();
        let album = Album {
            id: Uuid::new_v4().to_string(),
            user_id: owner.to_string(),
            name: validate_album_name(&new.name)?,
            description: normalize_text("Description", new.description)?,
            cover_photo_id: None,
            created_at: now,
            updated_at: now,
        };
        self.store.create_album(&album)?;

        tracing::info!(album_id = %album.id, user_id = %owner, "Created album");
        Ok(album)
    }

    pub fn get_album(&self, session: &Session, owner: &str, album_id: &str) -> Result<AlbumSummary> {
        let album = self.owned_album(session, owner, album_id)?;
        self.summarize(album)
    }

    /// Newest first, each with its member count and resolved cover.
    pub fn list_albums(&self, session: &Session, owner: &str) -> Result<Vec<AlbumSummary>> {
        session.require_owner(owner)?;
        self.store
            .list_albums(owner)?
            .into_iter()
            .map(|album| self.summarize(album))
            .collect()
    }

    fn summarize(&self, album: Album) -> Result<AlbumSummary> {
        let members = self.store.list_album_photos(&album.id)?;
        let cover = resolve_cover(&album, &members).cloned();
        Ok(AlbumSummary {
            photo_count: members.len() as i64,
            cover,
            album,
        })
    }

    pub fn update_album(
        &self,
        session: &Session,
        owner: &str,
        album_id: &str,
        changes: AlbumChanges,
    ) -> Result<Album> {
        let mut album = self.owned_album(session, owner, album_id)?;

        if let Some(name) = changes.name {
            album.name = validate_album_name(&name)?;
        }
        if let Some(description) = changes.description {
            album.description = normalize_text("Description", description)?;
        }
        if let Some(cover_photo_id) = changes.cover_photo_id {
            if let Some(photo_id) = &cover_photo_id {
                self.photo_for_owner(owner, photo_id)?;
            }
            album.cover_photo_id = cover_photo_id;
        }
        album.updated_at = now();

        self.store.update_album(&album).map_err(|e| match e {
            Error::NotFound => Error::Missing(Entity::Album),
            e => e,
        })?;
        Ok(album)
    }

    /// Removes the album and its memberships. Member photos are untouched.
    pub fn delete_album(&self, session: &Session, owner: &str, album_id: &str) -> Result<()> {
        let album = self.owned_album(session, owner, album_id)?;

        if !self.store.delete_album(&album.id)? {
            return Err(Error::Missing(Entity::Album));
        }

        tracing::info!(album_id = %album.id, user_id = %owner, "Deleted album");
        Ok(())
    }

    /// Adds every photo in `photo_ids` to the album and returns how many were
    /// not already members.
    ///
    /// All ids are checked before anything is written, and the insert runs in
    /// one transaction, so a failure leaves the membership set unchanged.
    pub fn add_photos_to_album(
        &self,
        session: &Session,
        owner: &str,
        album_id: &str,
        photo_ids: &[String],
    ) -> Result<usize> {
        let album = self.owned_album(session, owner, album_id)?;

        let photo_ids = dedupe_ids(photo_ids);
        for photo_id in &photo_ids {
            self.photo_for_owner(owner, photo_id)?;
        }

        let added = self.store.add_album_photos(&album.id, &photo_ids)?;
        tracing::debug!(album_id = %album.id, requested = photo_ids.len(), added, "Added photos to album");
        Ok(added)
    }

    /// Returns whether a membership was removed; removing a non-member is not
    /// an error.
    pub fn remove_photo_from_album(
        &self,
        session: &Session,
        owner: &str,
        album_id: &str,
        photo_id: &str,
    ) -> Result<bool> {
        let album = self.owned_album(session, owner, album_id)?;
        self.store.remove_album_photo(&album.id, photo_id)
    }

    /// Most recently added first.
    pub fn list_album_photos(
        &self,
        session: &Session,
        owner: &str,
        album_id: &str,
    ) -> Result<Vec<Photo>> {
        let album = self.owned_album(session, owner, album_id)?;
        self.store.list_album_photos(&album.id)
    }

    /// The owner's photos that are not in the album, newest first.
    pub fn list_available_photos(
        &self,
        session: &Session,
        owner: &str,
        album_id: &str,
    ) -> Result<Vec<Photo>> {
        let album = self.owned_album(session, owner, album_id)?;
        let owned = self.store.list_photos(owner)?;
        let members = self.store.list_album_photos(&album.id)?;
        Ok(available_photos(&owned, &members))
    }

    /// A photo referenced from one of `owner`'s albums: absent is not found,
    /// someone else's is forbidden.
    fn photo_for_owner(&self, owner: &str, photo_id: &str) -> Result<Photo> {
        let photo = self
            .store
            .get_photo(photo_id)?
            .ok_or(Error::Missing(Entity::Photo))?;
        if photo.user_id != owner {
            return Err(Error::Forbidden(format!(
                "Photo {photo_id} belongs to another user"
            )));
        }
        Ok(photo)
    }
}
