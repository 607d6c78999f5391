pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod gallery;
pub mod query;
pub mod server;
pub mod store;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::GalleryError;
pub use extract::{ExtractorRegistry, ImageMetadata, MetadataExtractor};
pub use gallery::Gallery;
pub use store::ImageStore;
