//! Application handle
//!
//! Built once from a `Config` and shared by the HTTP server and the CLI.
//! Holds no connection: every operation opens its own store and releases it
//! when the operation returns.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{GalleryError, Result};
use crate::extract::ExtractorRegistry;
use crate::query::{ListParams, Rating};
use crate::store::{ImagePage, ImageRecord, ImageStore};
use crate::sync::{self, ScanOptions, SyncReport};
use crate::Config;

#[derive(Clone)]
pub struct Gallery {
    database_path: PathBuf,
    scan: ScanOptions,
    registry: Arc<ExtractorRegistry>,
}

impl Gallery {
    /// Create the image root if needed and make sure the schema exists
    pub fn open(config: &Config) -> Result<Self> {
        let gallery = Self {
            database_path: config.database_path(),
            scan: ScanOptions {
                root: config.image_root(),
                extension: config.images.extension.clone(),
                recursive: config.images.recursive,
            },
            registry: Arc::new(ExtractorRegistry::new(config)),
        };

        std::fs::create_dir_all(&gallery.scan.root)?;
        gallery.store()?;

        info!(
            database = %gallery.database_path.display(),
            images = %gallery.scan.root.display(),
            "gallery opened"
        );
        Ok(gallery)
    }

    pub fn image_root(&self) -> &Path {
        &self.scan.root
    }

    /// Open a connection for one unit of work
    pub fn store(&self) -> Result<ImageStore> {
        ImageStore::open(&self.database_path)
    }

    pub fn sync(&self) -> Result<SyncReport> {
        let mut store = self.store()?;
        sync::sync(&mut store, &self.registry, &self.scan)
    }

    pub fn list(&self, params: ListParams) -> Result<ImagePage> {
        let params = params.validated()?;
        self.store()?.list(&params)
    }

    pub fn get(&self, id: i64) -> Result<ImageRecord> {
        self.store()?.get(id)
    }

    /// Validate before touching storage; a missing value is rejected too
    pub fn rate(&self, id: i64, rating: Option<i64>) -> Result<Rating> {
        let rating = Rating::try_from(rating.ok_or(GalleryError::MissingRating)?)?;
        self.store()?.update_rating(id, rating)?;
        info!(id, rating = %rating, "rating updated");
        Ok(rating)
    }

    /// Remove the backing file, then the row. A file that is already gone
    /// only produces a warning.
    pub fn delete(&self, id: i64) -> Result<()> {
        let store = self.store()?;
        let relative = store.image_path(id)?;
        let path = self.scan.root.join(&relative);

        match std::fs::remove_file(&path) {
            Ok(()) => info!(id, path = %path.display(), "image file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(id, path = %path.display(), "image file already missing, removing row only");
            }
            Err(source) => return Err(GalleryError::FileRemoval { path, source }),
        }

        store.delete(id)?;
        info!(id, "image deleted");
        Ok(())
    }
}
