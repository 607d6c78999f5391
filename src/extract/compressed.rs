//! zTXt / iTXt chunk extractor
//!
//! Same key semantics as the tEXt extractor, for generators that write
//! compressed (zTXt, Latin-1) or international (iTXt, UTF-8) text chunks.

use flate2::read::ZlibDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::warn;

use super::container::{Chunk, ChunkType, Chunks};
use super::text::{decode_latin1, TextScan};
use super::{ExtractError, ImageMetadata, MetadataExtractor};

/// The only compression method the PNG format defines (zlib deflate)
const COMPRESSION_DEFLATE: u8 = 0;

/// Upper bound on one inflated text payload
const MAX_TEXT_LEN: u64 = 2 * 1024 * 1024;

pub struct CompressedTextExtractor;

impl CompressedTextExtractor {
    pub const ID: &'static str = "png:zTXt";
}

impl MetadataExtractor for CompressedTextExtractor {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "PNG zTXt/iTXt chunks (compressed and international text)"
    }

    fn extract(&self, path: &Path) -> Result<Option<ImageMetadata>, ExtractError> {
        let file = File::open(path)?;
        let mut scan = TextScan::new();

        for chunk in Chunks::new(BufReader::new(file))? {
            let chunk = chunk?;
            let entry = match chunk.chunk_type {
                ChunkType::ZTXT => decode_ztxt(&chunk),
                ChunkType::ITXT => decode_itxt(&chunk),
                _ => continue,
            };

            match entry {
                Ok((key, value)) => {
                    if scan.apply(&key, &value) {
                        break;
                    }
                }
                Err(reason) => {
                    warn!(
                        path = %path.display(),
                        chunk = %chunk.chunk_type,
                        reason = %reason,
                        "skipping malformed text chunk"
                    );
                }
            }
        }

        Ok(scan.finish())
    }
}

/// keyword \0 method compressed-text
fn decode_ztxt(chunk: &Chunk) -> Result<(String, String), String> {
    let (keyword, rest) = split_null(&chunk.data).ok_or("missing keyword separator")?;
    let (&method, compressed) = rest.split_first().ok_or("missing compression method")?;
    if method != COMPRESSION_DEFLATE {
        return Err(format!("unknown compression method {}", method));
    }
    let text = inflate(compressed)?;
    Ok((decode_latin1(keyword), decode_latin1(&text)))
}

/// keyword \0 flag method language \0 translated-keyword \0 text
fn decode_itxt(chunk: &Chunk) -> Result<(String, String), String> {
    let (keyword, rest) = split_null(&chunk.data).ok_or("missing keyword separator")?;
    let [flag, method, rest @ ..] = rest else {
        return Err("missing compression fields".to_string());
    };
    let (_language, rest) = split_null(rest).ok_or("missing language tag")?;
    let (_translated, text) = split_null(rest).ok_or("missing translated keyword")?;

    let text = match (*flag, *method) {
        (0, _) => text.to_vec(),
        (1, COMPRESSION_DEFLATE) => inflate(text)?,
        (1, other) => return Err(format!("unknown compression method {}", other)),
        (other, _) => return Err(format!("invalid compression flag {}", other)),
    };

    Ok((
        decode_latin1(keyword),
        String::from_utf8_lossy(&text).into_owned(),
    ))
}

fn split_null(bytes: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = bytes.iter().position(|&b| b == 0)?;
    Some((&bytes[..pos], &bytes[pos + 1..]))
}

fn inflate(compressed: &[u8]) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    ZlibDecoder::new(compressed)
        .take(MAX_TEXT_LEN + 1)
        .read_to_end(&mut out)
        .map_err(|e| format!("decompression failed: {}", e))?;
    if out.len() as u64 > MAX_TEXT_LEN {
        return Err(format!("inflated text exceeds {} bytes", MAX_TEXT_LEN));
    }
    Ok(out)
}
