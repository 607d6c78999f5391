//! Image metadata storage with SQLite
//!
//! One `ImageStore` wraps one connection and is meant to live for a single
//! unit of work (an HTTP request or a sync pass). Dropping it releases the
//! connection on every exit path.

mod schema;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{GalleryError, Result};
use crate::extract::ImageMetadata;
use crate::query::{ListParams, Rating};

pub use schema::SCHEMA;

pub struct ImageStore {
    conn: Connection,
}

impl ImageStore {
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ============================================
    // SYNC
    // ============================================

    /// Every stored `image_path`, in one query
    pub fn indexed_paths(&self) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT image_path FROM images")?;
        let paths = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<String>>>()?;
        Ok(paths)
    }

    /// Start a batch of inserts that become visible together on commit
    pub fn begin_batch(&mut self) -> Result<SyncBatch<'_>> {
        Ok(SyncBatch {
            tx: self.conn.transaction()?,
        })
    }

    // ============================================
    // QUERIES
    // ============================================

    pub fn count_all(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Filtered, sorted page plus the filtered and unfiltered counts
    pub fn list(&self, params: &ListParams) -> Result<ImagePage> {
        // ?1 is NULL when there is no filter, so one statement covers both cases
        let where_clause = r"WHERE (?1 IS NULL OR search_text LIKE ?1 ESCAPE '\')";
        let pattern = params.like_pattern();

        let total_search_results_count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM images {}", where_clause),
            params![pattern],
            |row| row.get(0),
        )?;

        let total_database_count = self.count_all()?;

        // Offsets past what SQLite can address are past every row
        let Ok(offset) = i64::try_from(params.offset()) else {
            return Ok(ImagePage {
                images: vec![],
                total_search_results_count: total_search_results_count as u64,
                total_database_count,
            });
        };

        let direction = params.sort_order.keyword();
        let query = format!(
            "SELECT id, filename, image_path, rating
             FROM images
             {}
             ORDER BY {} {}, id {}
             LIMIT ?2 OFFSET ?3",
            where_clause,
            params.sort_by.column(),
            direction,
            direction
        );

        let mut stmt = self.conn.prepare(&query)?;
        let images = stmt
            .query_map(
                params![pattern, i64::from(params.limit), offset],
                |row| {
                    Ok(ImageSummary {
                        id: row.get(0)?,
                        filename: row.get(1)?,
                        image_path: row.get(2)?,
                        rating: row.get(3)?,
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(ImagePage {
            images,
            total_search_results_count: total_search_results_count as u64,
            total_database_count,
        })
    }

    pub fn get(&self, id: i64) -> Result<ImageRecord> {
        self.conn
            .query_row(
                r#"SELECT id, filename, image_path, rating, created_at,
                          prompt, negative_prompt, parameters, search_text
                   FROM images
                   WHERE id = ?"#,
                params![id],
                |row| {
                    Ok(ImageRecord {
                        id: row.get(0)?,
                        filename: row.get(1)?,
                        image_path: row.get(2)?,
                        rating: row.get(3)?,
                        created_at: row.get(4)?,
                        prompt: row.get(5)?,
                        negative_prompt: row.get(6)?,
                        parameters: row.get(7)?,
                        search_text: row.get(8)?,
                    })
                },
            )
            .optional()?
            .ok_or(GalleryError::NotFound(id))
    }

    /// Stored relative path of an image
    pub fn image_path(&self, id: i64) -> Result<String> {
        self.conn
            .query_row(
                "SELECT image_path FROM images WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(GalleryError::NotFound(id))
    }

    // ============================================
    // MUTATIONS
    // ============================================

    pub fn update_rating(&self, id: i64, rating: Rating) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE images SET rating = ? WHERE id = ?",
            params![rating.value(), id],
        )?;
        if updated == 0 {
            return Err(GalleryError::NotFound(id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM images WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(GalleryError::NotFound(id));
        }
        Ok(())
    }
}

/// Inserts made during one sync pass, committed together
pub struct SyncBatch<'a> {
    tx: Transaction<'a>,
}

impl SyncBatch<'_> {
    /// Insert a new row with rating 0. A failing statement leaves earlier
    /// inserts in the batch intact.
    pub fn insert(&self, image: &NewImage) -> Result<i64> {
        self.tx.execute(
            r#"INSERT INTO images
               (filename, image_path, rating, created_at, prompt, negative_prompt,
                parameters, search_text)
               VALUES (?, ?, 0, ?, ?, ?, ?, ?)"#,
            params![
                image.filename,
                image.image_path,
                format_timestamp(&image.created_at),
                image.metadata.prompt,
                image.metadata.negative_prompt,
                image.metadata.parameters,
                image.metadata.search_text(),
            ],
        )?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

/// Fixed-width RFC 3339 so text order matches time order
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ============================================
// ROW TYPES
// ============================================

#[derive(Debug, Clone)]
pub struct NewImage {
    pub filename: String,
    pub image_path: String,
    pub created_at: DateTime<Utc>,
    pub metadata: ImageMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSummary {
    pub id: i64,
    pub filename: String,
    pub image_path: String,
    pub rating: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    pub id: i64,
    pub filename: String,
    pub image_path: String,
    pub rating: i64,
    pub created_at: String,
    pub prompt: String,
    pub negative_prompt: String,
    pub parameters: String,
    pub search_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePage {
    pub images: Vec<ImageSummary>,
    pub total_search_results_count: u64,
    pub total_database_count: u64,
}
