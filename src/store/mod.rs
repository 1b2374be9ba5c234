mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Result of provisioning an identity: the rows plus whether they were new.
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub user: User,
    pub profile: Profile,
    pub created: bool,
}

/// Store defines the database interface.
///
/// Lookups here are unscoped; owner checks belong to [`crate::library`].
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    /// Creates the user and its profile atomically, or returns the existing
    /// pair when `email` is already known.
    fn provision_user(&self, email: &str) -> Result<Provisioned>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn delete_user(&self, id: &str) -> Result<bool>;

    // Profile operations
    fn get_profile_by_user(&self, user_id: &str) -> Result<Option<Profile>>;
    fn update_profile(&self, profile: &Profile) -> Result<()>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_id(&self, id: &str) -> Result<Option<Token>>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn list_user_tokens(&self, user_id: &str) -> Result<Vec<Token>>;
    fn delete_token(&self, id: &str) -> Result<bool>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;

    // Photo operations
    fn create_photo(&self, photo: &Photo) -> Result<()>;
    fn get_photo(&self, id: &str) -> Result<Option<Photo>>;
    /// Newest first.
    fn list_photos(&self, user_id: &str) -> Result<Vec<Photo>>;
    fn update_photo(&self, photo: &Photo) -> Result<()>;
    fn delete_photo(&self, id: &str) -> Result<bool>;

    // Album operations
    fn create_album(&self, album: &Album) -> Result<()>;
    fn get_album(&self, id: &str) -> Result<Option<Album>>;
    /// Newest first.
    fn list_albums(&self, user_id: &str) -> Result<Vec<Album>>;
    fn update_album(&self, album: &Album) -> Result<()>;
    fn delete_album(&self, id: &str) -> Result<bool>;

    // Album-Photo M2M operations
    /// Inserts every pair in one transaction, skipping pairs already present.
    /// Returns the number of new rows.
    fn add_album_photos(&self, album_id: &str, photo_ids: &[String]) -> Result<usize>;
    fn remove_album_photo(&self, album_id: &str, photo_id: &str) -> Result<bool>;
    /// Member photos, most recently added first.
    fn list_album_photos(&self, album_id: &str) -> Result<Vec<Photo>>;
    fn list_album_memberships(&self, album_id: &str) -> Result<Vec<AlbumPhoto>>;

    // Admin token check
    fn has_admin_token(&self) -> Result<bool>;
}
