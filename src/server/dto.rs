use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::library::{AlbumChanges, NewAlbum, NewPhoto, PhotoChanges, ProfileChanges};
use crate::types::{Profile, Token, User};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default)]`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub user: User,
    pub profile: Profile,
    pub created: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserTokenRequest {
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub id: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<Token> for TokenResponse {
    fn from(token: Token) -> Self {
        Self {
            id: token.id,
            is_admin: token.is_admin,
            user_id: token.user_id,
            created_at: token.created_at,
            expires_at: token.expires_at,
            last_used_at: token.last_used_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateTokenResponse {
    pub token: String,
    pub metadata: TokenResponse,
}

#[derive(Debug, Deserialize)]
pub struct CreatePhotoRequest {
    pub blob_key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<CreatePhotoRequest> for NewPhoto {
    fn from(req: CreatePhotoRequest) -> Self {
        Self {
            blob_key: req.blob_key,
            title: req.title,
            description: req.description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePhotoRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl From<UpdatePhotoRequest> for PhotoChanges {
    fn from(req: UpdatePhotoRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAlbumRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<CreateAlbumRequest> for NewAlbum {
    fn from(req: CreateAlbumRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAlbumRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_photo_id: Option<Option<String>>,
}

impl From<UpdateAlbumRequest> for AlbumChanges {
    fn from(req: UpdateAlbumRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            cover_photo_id: req.cover_photo_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AlbumPhotosRequest {
    pub photo_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AlbumPhotosResponse {
    pub added: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub display_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar_url: Option<Option<String>>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            display_name: req.display_name,
            avatar_url: req.avatar_url,
        }
    }
}
