//! SQLite schema definition
//!
//! `image_path` is the natural key: sync relies on its uniqueness to stay
//! idempotent. `search_text` is derived from prompt + negative prompt at
//! insert time and is what list queries match against.

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL,
    image_path TEXT NOT NULL UNIQUE,       -- relative to the image root, '/' separated
    rating INTEGER NOT NULL DEFAULT 0,     -- 0..=5, enforced by the API
    created_at TEXT NOT NULL,              -- RFC 3339 UTC, fixed width
    prompt TEXT NOT NULL DEFAULT '',
    negative_prompt TEXT NOT NULL DEFAULT '',
    parameters TEXT NOT NULL DEFAULT '',
    search_text TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_images_created_at ON images(created_at);
CREATE INDEX IF NOT EXISTS idx_images_rating ON images(rating);
"#;
