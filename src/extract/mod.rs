//! Metadata extractor trait and registry
//!
//! Extractors are tried in priority order and the first one that finds
//! generation metadata wins. Extraction never fails from the caller's point of
//! view: a file nobody can read yields empty metadata so sync can still index
//! it by path.

mod compressed;
pub mod container;
pub mod text;
mod text_chunk;

pub use compressed::CompressedTextExtractor;
pub use text_chunk::TextChunkExtractor;

use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::Config;

/// Generation metadata embedded in an image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    pub prompt: String,
    pub negative_prompt: String,
    /// Raw parameters block, trimmed
    pub parameters: String,
}

impl ImageMetadata {
    pub fn is_empty(&self) -> bool {
        self.prompt.is_empty() && self.negative_prompt.is_empty() && self.parameters.is_empty()
    }

    /// Search corpus: prompt and negative prompt, lowercased, with all
    /// whitespace runs collapsed to single spaces
    pub fn search_text(&self) -> String {
        self.prompt
            .split_whitespace()
            .chain(self.negative_prompt.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a PNG file")]
    NotPng,

    #[error("truncated {0} chunk")]
    Truncated(String),

    #[error("{chunk} chunk declares invalid length {length}")]
    ChunkTooLarge { chunk: String, length: u32 },

    #[error("CRC mismatch in {0} chunk")]
    CrcMismatch(String),
}

/// A strategy for pulling generation metadata out of an image file
pub trait MetadataExtractor: Send + Sync {
    /// Unique identifier, e.g. "png:tEXt"
    fn id(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// `Ok(None)` means the file carries nothing this extractor understands
    fn extract(&self, path: &Path) -> Result<Option<ImageMetadata>, ExtractError>;
}

/// Result of running one extractor during a probe
#[derive(Debug)]
pub struct ProbeOutcome {
    pub extractor_id: String,
    pub description: String,
    pub result: Result<Option<ImageMetadata>, ExtractError>,
}

/// Registry of extractors in priority order
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn MetadataExtractor>>,
}

impl ExtractorRegistry {
    pub fn new(config: &Config) -> Self {
        let mut registry = Self::empty();

        // Plain Latin-1 text chunks, the format most generators write
        if config.is_extractor_enabled(TextChunkExtractor::ID) {
            registry.register(Box::new(TextChunkExtractor));
        }

        // Compressed and international text chunks
        if config.is_extractor_enabled(CompressedTextExtractor::ID) {
            registry.register(Box::new(CompressedTextExtractor));
        }

        registry
    }

    pub fn empty() -> Self {
        Self { extractors: vec![] }
    }

    pub fn register(&mut self, extractor: Box<dyn MetadataExtractor>) {
        self.extractors.push(extractor);
    }

    pub fn extractors(&self) -> Vec<&dyn MetadataExtractor> {
        self.extractors.iter().map(|e| e.as_ref()).collect()
    }

    /// Run extractors in order until one finds metadata. Failures are logged
    /// and the next extractor is tried; if none succeeds the result is empty.
    pub fn extract(&self, path: &Path) -> ImageMetadata {
        for extractor in &self.extractors {
            match extractor.extract(path) {
                Ok(Some(metadata)) => {
                    debug!(extractor = extractor.id(), path = %path.display(), "metadata found");
                    return metadata;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        extractor = extractor.id(),
                        path = %path.display(),
                        error = %e,
                        "error reading image metadata"
                    );
                }
            }
        }

        debug!(path = %path.display(), "no metadata found, indexing by path only");
        ImageMetadata::default()
    }

    /// Run every extractor and report each outcome
    pub fn probe(&self, path: &Path) -> Vec<ProbeOutcome> {
        self.extractors
            .iter()
            .map(|extractor| ProbeOutcome {
                extractor_id: extractor.id().to_string(),
                description: extractor.description().to_string(),
                result: extractor.extract(path),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::test_support::{itxt_chunk, text_chunk, write_png};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixed {
        id: &'static str,
        result: fn() -> Result<Option<ImageMetadata>, ExtractError>,
        calls: Arc<AtomicUsize>,
    }

    impl MetadataExtractor for Fixed {
        fn id(&self) -> &str {
            self.id
        }

        fn description(&self) -> &str {
            "fixed result"
        }

        fn extract(&self, _path: &Path) -> Result<Option<ImageMetadata>, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn found() -> Result<Option<ImageMetadata>, ExtractError> {
        Ok(Some(ImageMetadata {
            prompt: "from fallback".to_string(),
            ..Default::default()
        }))
    }

    #[test]
    fn test_first_success_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ExtractorRegistry::empty();
        registry.register(Box::new(Fixed {
            id: "broken",
            result: || Err(ExtractError::NotPng),
            calls: calls.clone(),
        }));
        registry.register(Box::new(Fixed {
            id: "nothing",
            result: || Ok(None),
            calls: calls.clone(),
        }));
        registry.register(Box::new(Fixed {
            id: "found",
            result: found,
            calls: calls.clone(),
        }));
        registry.register(Box::new(Fixed {
            id: "never",
            result: found,
            calls: calls.clone(),
        }));

        let metadata = registry.extract(Path::new("unused.png"));
        assert_eq!(metadata.prompt, "from fallback");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_missing_file_yields_empty_metadata() {
        let registry = ExtractorRegistry::new(&Config::default());
        let metadata = registry.extract(Path::new("/definitely/not/here.png"));
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_falls_back_to_international_text() {
        let dir = TempDir::new().unwrap();
        let path = write_png(
            dir.path(),
            "itxt.png",
            &[
                text_chunk("Software", "editor"),
                itxt_chunk("parameters", "ein Hund\nNegative prompt: unscharf", false),
            ],
        );

        let registry = ExtractorRegistry::new(&Config::default());
        let metadata = registry.extract(&path);
        assert_eq!(metadata.prompt, "ein Hund");
        assert_eq!(metadata.negative_prompt, "unscharf");
    }

    #[test]
    fn test_disabled_extractors_are_not_registered() {
        let mut config = Config::default();
        config.extractors.insert(
            CompressedTextExtractor::ID.to_string(),
            ExtractorConfig { enabled: false },
        );
        let registry = ExtractorRegistry::new(&config);
        let ids: Vec<&str> = registry.extractors().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![TextChunkExtractor::ID]);
    }

    #[test]
    fn test_probe_reports_every_extractor() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "a.png", &[text_chunk("parameters", "a cat")]);

        let registry = ExtractorRegistry::new(&Config::default());
        let outcomes = registry.probe(&path);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].extractor_id, TextChunkExtractor::ID);
        assert!(matches!(outcomes[0].result, Ok(Some(_))));
        assert!(matches!(outcomes[1].result, Ok(None)));
    }

    #[test]
    fn test_search_text_normalises_whitespace() {
        let metadata = ImageMetadata {
            prompt: "  a   Cyberpunk\tCITY \n".to_string(),
            negative_prompt: "blurry,\n lowres".to_string(),
            parameters: "ignored for search".to_string(),
        };
        assert_eq!(metadata.search_text(), "a cyberpunk city blurry, lowres");
    }
}
