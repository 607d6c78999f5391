//! tEXt chunk extractor
//!
//! Reads uncompressed Latin-1 text chunks in file order. The first
//! `parameters` entry ends the scan; separate `prompt` / `negative_prompt`
//! entries seen before it are kept.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use super::container::{ChunkType, Chunks};
use super::text::{decode_latin1, split_keyword, TextScan};
use super::{ExtractError, ImageMetadata, MetadataExtractor};

pub struct TextChunkExtractor;

impl TextChunkExtractor {
    pub const ID: &'static str = "png:tEXt";
}

impl MetadataExtractor for TextChunkExtractor {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "PNG tEXt chunks (Latin-1 key/value text)"
    }

    fn extract(&self, path: &Path) -> Result<Option<ImageMetadata>, ExtractError> {
        let file = File::open(path)?;
        let mut scan = TextScan::new();

        for chunk in Chunks::new(BufReader::new(file))? {
            let chunk = chunk?;
            if chunk.chunk_type != ChunkType::TEXT {
                continue;
            }

            let text = decode_latin1(&chunk.data);
            let Some((key, value)) = split_keyword(&text) else {
                debug!(path = %path.display(), "skipping tEXt chunk without keyword separator");
                continue;
            };

            if scan.apply(key, value) {
                break;
            }
        }

        Ok(scan.finish())
    }
}
