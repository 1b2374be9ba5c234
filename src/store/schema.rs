pub const SCHEMA: &str = r#"
-- Identities issued by the auth layer; everything else is keyed by users.id
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Exactly one profile per user, created together with the user
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    display_name TEXT,
    avatar_url TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Tokens are auth credentials; non-admin tokens must belong to a user
CREATE TABLE IF NOT EXISTS tokens (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,        -- first 8 chars of ID for fast lookup
    is_admin INTEGER NOT NULL DEFAULT 0,  -- admin tokens only access /api/v1/admin/* routes

    -- User binding (required for non-admin tokens, NULL only for admin tokens)
    user_id TEXT REFERENCES users(id) ON DELETE CASCADE,

    -- Lifecycle
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,            -- NULL = never
    last_used_at TEXT
);

-- Photos; bytes live in the blob store under storage_key
CREATE TABLE IF NOT EXISTS photos (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    storage_key TEXT NOT NULL,
    url TEXT NOT NULL,
    title TEXT,
    description TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Albums; the cover survives as NULL when its photo is deleted
CREATE TABLE IF NOT EXISTS albums (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    description TEXT,
    cover_photo_id TEXT REFERENCES photos(id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Many-to-many relationship between albums and photos
CREATE TABLE IF NOT EXISTS album_photos (
    album_id TEXT NOT NULL REFERENCES albums(id) ON DELETE CASCADE,
    photo_id TEXT NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
    added_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (album_id, photo_id)
);

-- Create indexes
CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_lookup ON tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_tokens_user ON tokens(user_id);
CREATE INDEX IF NOT EXISTS idx_photos_user ON photos(user_id);
CREATE INDEX IF NOT EXISTS idx_albums_user ON albums(user_id);
CREATE INDEX IF NOT EXISTS idx_albums_cover ON albums(cover_photo_id);
CREATE INDEX IF NOT EXISTS idx_album_photos_photo ON album_photos(photo_id);
"#;
