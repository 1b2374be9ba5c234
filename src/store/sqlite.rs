use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use uuid::Uuid;

use super::schema::SCHEMA;
use super::{Provisioned, Store};
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

// Fixed width so that lexical order in SQL matches chronological order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

const USER_COLUMNS: &str = "id, email, created_at";
const PROFILE_COLUMNS: &str = "id, user_id, display_name, avatar_url, created_at, updated_at";
const TOKEN_COLUMNS: &str =
    "id, token_hash, token_lookup, is_admin, user_id, created_at, expires_at, last_used_at";
const PHOTO_COLUMNS: &str = "id, user_id, storage_key, url, title, description, created_at";
const ALBUM_COLUMNS: &str =
    "id, user_id, name, description, cover_photo_id, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        created_at: parse_datetime(&row.get::<_, String>(2)?),
    })
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        display_name: row.get(2)?,
        avatar_url: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn token_from_row(row: &Row<'_>) -> rusqlite::Result<Token> {
    Ok(Token {
        id: row.get(0)?,
        token_hash: row.get(1)?,
        token_lookup: row.get(2)?,
        is_admin: row.get(3)?,
        user_id: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        expires_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
        last_used_at: row.get::<_, Option<String>>(7)?.map(|s| parse_datetime(&s)),
    })
}

fn photo_from_row(row: &Row<'_>) -> rusqlite::Result<Photo> {
    Ok(Photo {
        id: row.get(0)?,
        user_id: row.get(1)?,
        storage_key: row.get(2)?,
        url: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn album_from_row(row: &Row<'_>) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        cover_photo_id: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
        params![email],
        user_from_row,
    )
    .optional()
    .map_err(Error::from)
}

fn query_profile_by_user(conn: &Connection, user_id: &str) -> Result<Option<Profile>> {
    conn.query_row(
        &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
        params![user_id],
        profile_from_row,
    )
    .optional()
    .map_err(Error::from)
}

/// Removes `id` from `entity`'s table after applying every rule in
/// [`DELETE_RULES`] whose parent is `entity`. Cascades recurse into children
/// that have rules of their own.
fn delete_with_rules(conn: &Connection, entity: Entity, id: &str) -> Result<bool> {
    for rule in delete_rules_for(entity) {
        let table = rule.child.table();
        let column = rule.column;

        match rule.action {
            OnDelete::SetNull => {
                conn.execute(
                    &format!("UPDATE {table} SET {column} = NULL WHERE {column} = ?1"),
                    params![id],
                )?;
            }
            OnDelete::Cascade => match rule.child.id_column() {
                Some(id_column) if rule.child.has_dependents() => {
                    let child_ids = {
                        let mut stmt = conn.prepare(&format!(
                            "SELECT {id_column} FROM {table} WHERE {column} = ?1"
                        ))?;
                        let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
                        rows.collect::<std::result::Result<Vec<_>, _>>()?
                    };
                    for child_id in child_ids {
                        delete_with_rules(conn, rule.child, &child_id)?;
                    }
                }
                _ => {
                    conn.execute(
                        &format!("DELETE FROM {table} WHERE {column} = ?1"),
                        params![id],
                    )?;
                }
            },
        }
    }

    let Some(id_column) = entity.id_column() else {
        return Err(Error::Config(format!("{entity} cannot be deleted by id")));
    };
    let rows = conn.execute(
        &format!("DELETE FROM {} WHERE {id_column} = ?1", entity.table()),
        params![id],
    )?;
    Ok(rows > 0)
}

impl SqliteStore {
    fn delete_entity(&self, entity: Entity, id: &str) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let deleted = delete_with_rules(&tx, entity, id)?;
        tx.commit()?;
        Ok(deleted)
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn provision_user(&self, email: &str) -> Result<Provisioned> {
        let mut conn = self.conn();
        // IMMEDIATE takes the write lock up front so two processes racing on
        // the same email serialize here instead of failing at commit.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = format_datetime(&Utc::now());

        let inserted = tx.execute(
            "INSERT INTO users (id, email, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(email) DO NOTHING",
            params![Uuid::new_v4().to_string(), email, now],
        )?;

        let user = query_user_by_email(&tx, email)?.ok_or(Error::NotFound)?;

        tx.execute(
            "INSERT INTO profiles (id, user_id, display_name, avatar_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, NULL, ?4, ?4)
             ON CONFLICT(user_id) DO NOTHING",
            params![Uuid::new_v4().to_string(), user.id, email, now],
        )?;

        let profile = query_profile_by_user(&tx, &user.id)?.ok_or(Error::NotFound)?;

        tx.commit()?;

        Ok(Provisioned {
            user,
            profile,
            created: inserted > 0,
        })
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY email"
        ))?;

        let rows = stmt.query_map([], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        self.delete_entity(Entity::User, id)
    }

    // Profile operations

    fn get_profile_by_user(&self, user_id: &str) -> Result<Option<Profile>> {
        query_profile_by_user(&self.conn(), user_id)
    }

    fn update_profile(&self, profile: &Profile) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE profiles SET display_name = ?1, avatar_url = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                profile.display_name,
                profile.avatar_url,
                format_datetime(&profile.updated_at),
                profile.id
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, is_admin, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.is_admin,
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::TokenLookupCollision),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_id(&self, id: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE id = ?1"),
            params![id],
            token_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE token_lookup = ?1"),
            params![lookup],
            token_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_user_tokens(&self, user_id: &str) -> Result<Vec<Token>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens WHERE user_id = ?1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![user_id], token_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_token(&self, id: &str) -> Result<bool> {
        self.delete_entity(Entity::Token, id)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    // Photo operations

    fn create_photo(&self, photo: &Photo) -> Result<()> {
        self.conn().execute(
            "INSERT INTO photos (id, user_id, storage_key, url, title, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                photo.id,
                photo.user_id,
                photo.storage_key,
                photo.url,
                photo.title,
                photo.description,
                format_datetime(&photo.created_at),
            ],
        )?;
        Ok(())
    }

    fn get_photo(&self, id: &str) -> Result<Option<Photo>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = ?1"),
            params![id],
            photo_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_photos(&self, user_id: &str) -> Result<Vec<Photo>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))?;

        let rows = stmt.query_map(params![user_id], photo_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_photo(&self, photo: &Photo) -> Result<()> {
        // user_id, storage_key and url are fixed at creation.
        let rows = self.conn().execute(
            "UPDATE photos SET title = ?1, description = ?2 WHERE id = ?3",
            params![photo.title, photo.description, photo.id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_photo(&self, id: &str) -> Result<bool> {
        self.delete_entity(Entity::Photo, id)
    }

    // Album operations

    fn create_album(&self, album: &Album) -> Result<()> {
        self.conn().execute(
            "INSERT INTO albums (id, user_id, name, description, cover_photo_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                album.id,
                album.user_id,
                album.name,
                album.description,
                album.cover_photo_id,
                format_datetime(&album.created_at),
                format_datetime(&album.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_album(&self, id: &str) -> Result<Option<Album>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {ALBUM_COLUMNS} FROM albums WHERE id = ?1"),
            params![id],
            album_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_albums(&self, user_id: &str) -> Result<Vec<Album>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ALBUM_COLUMNS} FROM albums WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))?;

        let rows = stmt.query_map(params![user_id], album_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_album(&self, album: &Album) -> Result<()> {
        let result = self.conn().execute(
            "UPDATE albums SET name = ?1, description = ?2, cover_photo_id = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                album.name,
                album.description,
                album.cover_photo_id,
                format_datetime(&album.updated_at),
                album.id
            ],
        );

        match result {
            Ok(0) => Err(Error::NotFound),
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => {
                Err(Error::Conflict("cover photo no longer exists".to_string()))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn delete_album(&self, id: &str) -> Result<bool> {
        self.delete_entity(Entity::Album, id)
    }

    // Album-Photo M2M operations

    fn add_album_photos(&self, album_id: &str, photo_ids: &[String]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let mut inserted = 0;
        for photo_id in photo_ids {
            let result = tx.execute(
                "INSERT OR IGNORE INTO album_photos (album_id, photo_id, added_at) VALUES (?1, ?2, ?3)",
                params![album_id, photo_id, format_datetime(&Utc::now())],
            );
            match result {
                Ok(rows) => inserted += rows,
                // Dropping the transaction rolls back every pair added so far.
                Err(e) if is_constraint_violation(&e) => {
                    return Err(Error::Conflict(format!(
                        "album {album_id} or photo {photo_id} no longer exists"
                    )));
                }
                Err(e) => return Err(Error::from(e)),
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn remove_album_photo(&self, album_id: &str, photo_id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM album_photos WHERE album_id = ?1 AND photo_id = ?2",
            params![album_id, photo_id],
        )?;
        Ok(rows > 0)
    }

    fn list_album_photos(&self, album_id: &str) -> Result<Vec<Photo>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT p.id, p.user_id, p.storage_key, p.url, p.title, p.description, p.created_at
             FROM photos p
             JOIN album_photos ap ON p.id = ap.photo_id
             WHERE ap.album_id = ?1
             ORDER BY ap.added_at DESC, ap.rowid DESC",
        )?;

        let rows = stmt.query_map(params![album_id], photo_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_album_memberships(&self, album_id: &str) -> Result<Vec<AlbumPhoto>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT album_id, photo_id, added_at FROM album_photos
             WHERE album_id = ?1
             ORDER BY added_at DESC, rowid DESC",
        )?;

        let rows = stmt.query_map(params![album_id], |row| {
            Ok(AlbumPhoto {
                album_id: row.get(0)?,
                photo_id: row.get(1)?,
                added_at: parse_datetime(&row.get::<_, String>(2)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn has_admin_token(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM tokens WHERE is_admin = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
