//! Directory sync
//!
//! One-way reconciliation: files under the image root that have no row yet
//! get one. Rows are never removed for files that disappeared. Running two
//! passes at once is not supported; the loser of a race on the same file
//! sees a uniqueness failure for that row and moves on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{GalleryError, Result};
use crate::extract::ExtractorRegistry;
use crate::store::{ImageStore, NewImage};

/// Where and what to scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    /// Extension without the dot, compared case-insensitively
    pub extension: String,
    pub recursive: bool,
}

/// An image file found under the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// Root-relative, '/' separated
    pub relative_path: String,
    pub filename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Files on disk without a row before this pass
    pub discovered: usize,
    pub synced: usize,
    pub failed: usize,
}

/// Enumerate image files under the root, sorted by relative path
pub fn scan_images(options: &ScanOptions) -> Result<Vec<ScannedFile>> {
    if !options.root.is_dir() {
        return Err(GalleryError::NotADirectory(options.root.clone()));
    }

    let mut walker = WalkDir::new(&options.root).follow_links(true);
    if !options.recursive {
        walker = walker.max_depth(1);
    }

    let mut files = vec![];
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // An unreadable root is fatal, anything below it is skipped
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let matches_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(&options.extension))
            .unwrap_or(false);
        if !matches_extension {
            continue;
        }

        let Some(relative_path) = relative_key(&options.root, path) else {
            warn!(path = %path.display(), "skipping file with non UTF-8 path");
            continue;
        };

        files.push(ScannedFile {
            path: path.to_path_buf(),
            filename: entry.file_name().to_string_lossy().into_owned(),
            relative_path,
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(files)
}

/// Root-relative path joined with '/' regardless of platform
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// Index every image under the root that is not in the store yet
pub fn sync(
    store: &mut ImageStore,
    registry: &ExtractorRegistry,
    options: &ScanOptions,
) -> Result<SyncReport> {
    info!(root = %options.root.display(), "starting database sync");

    let existing = store.indexed_paths()?;
    let candidates: Vec<ScannedFile> = scan_images(options)?
        .into_iter()
        .filter(|f| !existing.contains(&f.relative_path))
        .collect();
    info!(
        existing = existing.len(),
        new = candidates.len(),
        "found new images to process"
    );

    let mut report = SyncReport {
        discovered: candidates.len(),
        ..Default::default()
    };

    let batch = store.begin_batch()?;
    for file in &candidates {
        let image = NewImage {
            filename: file.filename.clone(),
            image_path: file.relative_path.clone(),
            created_at: modified_time(&file.path),
            metadata: registry.extract(&file.path),
        };

        match batch.insert(&image) {
            Ok(id) => {
                info!(id, path = %file.relative_path, "inserted image");
                report.synced += 1;
            }
            Err(e) => {
                warn!(path = %file.relative_path, error = %e, "error inserting image into database");
                report.failed += 1;
            }
        }
    }
    batch.commit()?;

    info!(
        synced = report.synced,
        failed = report.failed,
        "database sync complete"
    );
    Ok(report)
}

/// File modification time, or now when the platform cannot report it
fn modified_time(path: &Path) -> DateTime<Utc> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}
