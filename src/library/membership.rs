//! Pure set logic over album membership. Nothing here touches the store.

use std::collections::HashSet;

use crate::types::{Album, Photo};

/// Photos from `owned` that are not in `members`, in `owned`'s order.
///
/// The result is disjoint from `members`; when every member comes from
/// `owned`, the two together are exactly `owned`.
#[must_use]
pub fn available_photos(owned: &[Photo], members: &[Photo]) -> Vec<Photo> {
    let member_ids: HashSet<&str> = members.iter().map(|p| p.id.as_str()).collect();
    owned
        .iter()
        .filter(|p| !member_ids.contains(p.id.as_str()))
        .cloned()
        .collect()
}

/// Picks the image shown for an album.
///
/// `members` must be ordered most recently added first. The explicit cover
/// wins only while it is still a member; otherwise the newest member is used.
#[must_use]
pub fn resolve_cover<'a>(album: &Album, members: &'a [Photo]) -> Option<&'a Photo> {
    album
        .cover_photo_id
        .as_deref()
        .and_then(|cover_id| members.iter().find(|p| p.id == cover_id))
        .or_else(|| members.first())
}

/// Drops repeated ids, keeping the first occurrence of each.
#[must_use]
pub fn dedupe_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
