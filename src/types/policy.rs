//! Access and deletion rules for every persisted entity.
//!
//! The store walks [`DELETE_RULES`] when removing a row instead of leaning on
//! whatever the foreign keys happen to declare, so the asymmetry between
//! cascading a membership and clearing a cover reference is written down once.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    User,
    Profile,
    Token,
    Photo,
    Album,
    AlbumPhoto,
}

impl Entity {
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Entity::User => "users",
            Entity::Profile => "profiles",
            Entity::Token => "tokens",
            Entity::Photo => "photos",
            Entity::Album => "albums",
            Entity::AlbumPhoto => "album_photos",
        }
    }

    /// Human-readable singular name, used in error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Entity::User => "user",
            Entity::Profile => "profile",
            Entity::Token => "token",
            Entity::Photo => "photo",
            Entity::Album => "album",
            Entity::AlbumPhoto => "album membership",
        }
    }

    /// Single-column primary key, if the entity has one.
    #[must_use]
    pub const fn id_column(self) -> Option<&'static str> {
        match self {
            Entity::AlbumPhoto => None,
            _ => Some("id"),
        }
    }

    #[must_use]
    pub const fn read_scope(self) -> ReadScope {
        match self {
            Entity::Profile => ReadScope::AnyUser,
            _ => ReadScope::Owner,
        }
    }

    /// Returns true if removing a row of this entity touches other rows.
    #[must_use]
    pub fn has_dependents(self) -> bool {
        delete_rules_for(self).next().is_some()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Who may read a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadScope {
    /// Only the user stored in the row's `user_id`.
    Owner,
    /// Any authenticated user.
    AnyUser,
}

impl ReadScope {
    #[must_use]
    pub fn allows(self, caller_id: &str, owner_id: &str) -> bool {
        match self {
            ReadScope::Owner => caller_id == owner_id,
            ReadScope::AnyUser => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    /// Remove the dependent row.
    Cascade,
    /// Keep the dependent row and null out the reference.
    SetNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRule {
    pub parent: Entity,
    pub child: Entity,
    /// Column on the child's table that references the parent's id.
    pub column: &'static str,
    pub action: OnDelete,
}

pub const DELETE_RULES: &[DeleteRule] = &[
    DeleteRule {
        parent: Entity::User,
        child: Entity::Profile,
        column: "user_id",
        action: OnDelete::Cascade,
    },
    DeleteRule {
        parent: Entity::User,
        child: Entity::Token,
        column: "user_id",
        action: OnDelete::Cascade,
    },
    DeleteRule {
        parent: Entity::User,
        child: Entity::Album,
        column: "user_id",
        action: OnDelete::Cascade,
    },
    DeleteRule {
        parent: Entity::User,
        child: Entity::Photo,
        column: "user_id",
        action: OnDelete::Cascade,
    },
    DeleteRule {
        parent: Entity::Photo,
        child: Entity::AlbumPhoto,
        column: "photo_id",
        action: OnDelete::Cascade,
    },
    DeleteRule {
        parent: Entity::Photo,
        child: Entity::Album,
        column: "cover_photo_id",
        action: OnDelete::SetNull,
    },
    DeleteRule {
        parent: Entity::Album,
        child: Entity::AlbumPhoto,
        column: "album_id",
        action: OnDelete::Cascade,
    },
];

pub fn delete_rules_for(parent: Entity) -> impl Iterator<Item = &'static DeleteRule> {
    DELETE_RULES.iter().filter(move |rule| rule.parent == parent)
}
