//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O. Structural statements shared by every nested-set
//! table live in [`super::tree`], parameterised by table name.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Users table (flat)
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    phone TEXT UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

-- Media table (nested set)
CREATE TABLE IF NOT EXISTS media (
    id TEXT PRIMARY KEY,
    parent_id TEXT REFERENCES media(id),
    name TEXT NOT NULL,
    hash TEXT,
    file_name TEXT NOT NULL,
    disk TEXT NOT NULL,
    mime_type TEXT NOT NULL,
    size INTEGER NOT NULL,
    custom_attributes TEXT,
    record_left INTEGER NOT NULL,
    record_right INTEGER NOT NULL,
    record_depth INTEGER NOT NULL,
    record_ordering INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

-- Taxonomies table (nested set)
CREATE TABLE IF NOT EXISTS taxonomies (
    id TEXT PRIMARY KEY,
    parent_id TEXT REFERENCES taxonomies(id),
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    code TEXT,
    description TEXT,
    record_left INTEGER NOT NULL,
    record_right INTEGER NOT NULL,
    record_depth INTEGER NOT NULL,
    record_ordering INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

-- Settings table (key/value, hard delete)
CREATE TABLE IF NOT EXISTS settings (
    id TEXT PRIMARY KEY,
    key TEXT NOT NULL UNIQUE,
    value TEXT NOT NULL,
    model_type TEXT,
    model_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Indexes for interval and parent lookups
CREATE INDEX IF NOT EXISTS idx_media_interval ON media(record_left, record_right);
CREATE INDEX IF NOT EXISTS idx_media_parent_id ON media(parent_id);
CREATE INDEX IF NOT EXISTS idx_media_hash ON media(hash);
CREATE INDEX IF NOT EXISTS idx_taxonomies_interval ON taxonomies(record_left, record_right);
CREATE INDEX IF NOT EXISTS idx_taxonomies_parent_id ON taxonomies(parent_id);
"#;

// ============================================================================
// User queries
// ============================================================================

pub const INSERT_USER: &str = r#"
INSERT INTO users (id, username, email, phone, created_at, updated_at, deleted_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, username, email, phone, created_at, updated_at, deleted_at
FROM users
WHERE id = ?1 AND deleted_at IS NULL
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, username, email, phone, created_at, updated_at, deleted_at
FROM users
WHERE email = ?1 AND deleted_at IS NULL
"#;

pub const SELECT_USER_BY_PHONE: &str = r#"
SELECT id, username, email, phone, created_at, updated_at, deleted_at
FROM users
WHERE phone = ?1 AND deleted_at IS NULL
"#;

pub const SELECT_USER_BY_USERNAME: &str = r#"
SELECT id, username, email, phone, created_at, updated_at, deleted_at
FROM users
WHERE username = ?1 AND deleted_at IS NULL
"#;

pub const SELECT_USERS: &str = r#"
SELECT id, username, email, phone, created_at, updated_at, deleted_at
FROM users
WHERE deleted_at IS NULL
ORDER BY rowid
"#;

/// `?1` is the raw query (empty matches all), `?2` its escaped LIKE pattern.
pub const COUNT_USERS_MATCHING: &str = r#"
SELECT COUNT(*)
FROM users
WHERE deleted_at IS NULL
  AND (?1 = '' OR username LIKE ?2 ESCAPE '\' OR email LIKE ?2 ESCAPE '\' OR phone LIKE ?2 ESCAPE '\')
"#;

pub const SELECT_USERS_MATCHING: &str = r#"
SELECT id, username, email, phone, created_at, updated_at, deleted_at
FROM users
WHERE deleted_at IS NULL
  AND (?1 = '' OR username LIKE ?2 ESCAPE '\' OR email LIKE ?2 ESCAPE '\' OR phone LIKE ?2 ESCAPE '\')
ORDER BY rowid
LIMIT ?3 OFFSET ?4
"#;

pub const UPDATE_USER: &str = r#"
UPDATE users
SET username = ?2, email = ?3, phone = ?4, updated_at = ?5
WHERE id = ?1 AND deleted_at IS NULL
"#;

/// Returns one row per existing user, deleted or not.
pub const SELECT_USER_DELETED_AT: &str = r#"
SELECT deleted_at FROM users WHERE id = ?1
"#;

pub const SOFT_DELETE_USER: &str = r#"
UPDATE users
SET deleted_at = ?2, updated_at = ?2
WHERE id = ?1 AND deleted_at IS NULL
"#;

/// Existence checks cover soft-deleted rows too, like the UNIQUE constraints.
pub const USER_EMAIL_EXISTS: &str = r#"
SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)
"#;

pub const USER_PHONE_EXISTS: &str = r#"
SELECT EXISTS(SELECT 1 FROM users WHERE phone = ?1)
"#;

// ============================================================================
// Media queries
// ============================================================================

pub const INSERT_MEDIA: &str = r#"
INSERT INTO media (
    id, parent_id, name, hash, file_name, disk, mime_type, size, custom_attributes,
    record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
"#;

pub const SELECT_MEDIA_BY_ID: &str = r#"
SELECT id, parent_id, name, hash, file_name, disk, mime_type, size, custom_attributes,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM media
WHERE id = ?1 AND deleted_at IS NULL
"#;

pub const SELECT_MEDIA_BY_HASH: &str = r#"
SELECT id, parent_id, name, hash, file_name, disk, mime_type, size, custom_attributes,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM media
WHERE hash = ?1 AND deleted_at IS NULL
ORDER BY rowid
LIMIT 1
"#;

pub const SELECT_MEDIA_BY_FILE_NAME: &str = r#"
SELECT id, parent_id, name, hash, file_name, disk, mime_type, size, custom_attributes,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM media
WHERE file_name = ?1 AND deleted_at IS NULL
ORDER BY rowid
LIMIT 1
"#;

pub const SELECT_MEDIA: &str = r#"
SELECT id, parent_id, name, hash, file_name, disk, mime_type, size, custom_attributes,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM media
WHERE deleted_at IS NULL
ORDER BY record_ordering IS NULL, record_ordering, rowid
"#;

pub const COUNT_MEDIA_MATCHING: &str = r#"
SELECT COUNT(*)
FROM media
WHERE deleted_at IS NULL
  AND (?1 = '' OR name LIKE ?2 ESCAPE '\' OR file_name LIKE ?2 ESCAPE '\')
"#;

pub const SELECT_MEDIA_MATCHING: &str = r#"
SELECT id, parent_id, name, hash, file_name, disk, mime_type, size, custom_attributes,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM media
WHERE deleted_at IS NULL
  AND (?1 = '' OR name LIKE ?2 ESCAPE '\' OR file_name LIKE ?2 ESCAPE '\')
ORDER BY record_ordering IS NULL, record_ordering, rowid
LIMIT ?3 OFFSET ?4
"#;

/// `parent_id IS ?1` matches roots when `?1` is NULL.
pub const SELECT_MEDIA_CHILDREN: &str = r#"
SELECT id, parent_id, name, hash, file_name, disk, mime_type, size, custom_attributes,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM media
WHERE deleted_at IS NULL AND parent_id IS ?1
ORDER BY record_ordering IS NULL, record_ordering, rowid
"#;

pub const COUNT_MEDIA_CHILDREN_MATCHING: &str = r#"
SELECT COUNT(*)
FROM media
WHERE deleted_at IS NULL AND parent_id IS ?1
  AND (?2 = '' OR name LIKE ?3 ESCAPE '\' OR file_name LIKE ?3 ESCAPE '\')
"#;

pub const SELECT_MEDIA_CHILDREN_MATCHING: &str = r#"
SELECT id, parent_id, name, hash, file_name, disk, mime_type, size, custom_attributes,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM media
WHERE deleted_at IS NULL AND parent_id IS ?1
  AND (?2 = '' OR name LIKE ?3 ESCAPE '\' OR file_name LIKE ?3 ESCAPE '\')
ORDER BY record_ordering IS NULL, record_ordering, rowid
LIMIT ?4 OFFSET ?5
"#;

pub const UPDATE_MEDIA: &str = r#"
UPDATE media
SET name = ?2, hash = ?3, file_name = ?4, disk = ?5, mime_type = ?6, size = ?7,
    custom_attributes = ?8, record_ordering = ?9, updated_at = ?10
WHERE id = ?1 AND deleted_at IS NULL
"#;

pub const SELECT_MEDIA_SUBTREE: &str = r#"
SELECT id, parent_id, name, hash, file_name, disk, mime_type, size, custom_attributes,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM media
WHERE deleted_at IS NULL AND record_left >= ?1 AND record_right <= ?2
ORDER BY record_left
"#;

pub const SELECT_MEDIA_ANCESTORS: &str = r#"
SELECT id, parent_id, name, hash, file_name, disk, mime_type, size, custom_attributes,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM media
WHERE deleted_at IS NULL AND record_left < ?1 AND record_right > ?2
ORDER BY record_left
"#;

// ============================================================================
// Taxonomy queries
// ============================================================================

pub const INSERT_TAXONOMY: &str = r#"
INSERT INTO taxonomies (
    id, parent_id, name, slug, code, description,
    record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
"#;

pub const SELECT_TAXONOMY_BY_ID: &str = r#"
SELECT id, parent_id, name, slug, code, description,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM taxonomies
WHERE id = ?1 AND deleted_at IS NULL
"#;

pub const SELECT_TAXONOMY_BY_SLUG: &str = r#"
SELECT id, parent_id, name, slug, code, description,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM taxonomies
WHERE slug = ?1 AND deleted_at IS NULL
"#;

pub const SELECT_TAXONOMIES: &str = r#"
SELECT id, parent_id, name, slug, code, description,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM taxonomies
WHERE deleted_at IS NULL
ORDER BY record_ordering IS NULL, record_ordering, rowid
"#;

pub const COUNT_TAXONOMIES_MATCHING: &str = r#"
SELECT COUNT(*)
FROM taxonomies
WHERE deleted_at IS NULL
  AND (?1 = '' OR name LIKE ?2 ESCAPE '\' OR slug LIKE ?2 ESCAPE '\')
"#;

pub const SELECT_TAXONOMIES_MATCHING: &str = r#"
SELECT id, parent_id, name, slug, code, description,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM taxonomies
WHERE deleted_at IS NULL
  AND (?1 = '' OR name LIKE ?2 ESCAPE '\' OR slug LIKE ?2 ESCAPE '\')
ORDER BY record_ordering IS NULL, record_ordering, rowid
LIMIT ?3 OFFSET ?4
"#;

pub const SELECT_TAXONOMY_CHILDREN: &str = r#"
SELECT id, parent_id, name, slug, code, description,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM taxonomies
WHERE deleted_at IS NULL AND parent_id IS ?1
ORDER BY record_ordering IS NULL, record_ordering, rowid
"#;

pub const COUNT_TAXONOMY_CHILDREN_MATCHING: &str = r#"
SELECT COUNT(*)
FROM taxonomies
WHERE deleted_at IS NULL AND parent_id IS ?1
  AND (?2 = '' OR name LIKE ?3 ESCAPE '\' OR slug LIKE ?3 ESCAPE '\')
"#;

pub const SELECT_TAXONOMY_CHILDREN_MATCHING: &str = r#"
SELECT id, parent_id, name, slug, code, description,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM taxonomies
WHERE deleted_at IS NULL AND parent_id IS ?1
  AND (?2 = '' OR name LIKE ?3 ESCAPE '\' OR slug LIKE ?3 ESCAPE '\')
ORDER BY record_ordering IS NULL, record_ordering, rowid
LIMIT ?4 OFFSET ?5
"#;

pub const UPDATE_TAXONOMY: &str = r#"
UPDATE taxonomies
SET name = ?2, slug = ?3, code = ?4, description = ?5, record_ordering = ?6, updated_at = ?7
WHERE id = ?1 AND deleted_at IS NULL
"#;

pub const SELECT_TAXONOMY_SUBTREE: &str = r#"
SELECT id, parent_id, name, slug, code, description,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM taxonomies
WHERE deleted_at IS NULL AND record_left >= ?1 AND record_right <= ?2
ORDER BY record_left
"#;

pub const SELECT_TAXONOMY_ANCESTORS: &str = r#"
SELECT id, parent_id, name, slug, code, description,
       record_left, record_right, record_depth, record_ordering, created_at, updated_at, deleted_at
FROM taxonomies
WHERE deleted_at IS NULL AND record_left < ?1 AND record_right > ?2
ORDER BY record_left
"#;

// ============================================================================
// Setting queries
// ============================================================================

pub const SELECT_SETTING_BY_KEY: &str = r#"
SELECT id, key, value, model_type, model_id, created_at, updated_at
FROM settings
WHERE key = ?1
"#;

pub const SELECT_SETTINGS: &str = r#"
SELECT id, key, value, model_type, model_id, created_at, updated_at
FROM settings
ORDER BY rowid
"#;

/// Upsert keyed by `key`; an existing row keeps its id and `created_at`.
pub const UPSERT_SETTING: &str = r#"
INSERT INTO settings (id, key, value, model_type, model_id, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
ON CONFLICT(key) DO UPDATE SET
    value = excluded.value,
    model_type = excluded.model_type,
    model_id = excluded.model_id,
    updated_at = excluded.updated_at
"#;

pub const DELETE_SETTING: &str = r#"
DELETE FROM settings WHERE key = ?1
"#;
