//! Fixtures for tests: configuration and synthesised PNG files

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::extract::container::{ChunkType, PNG_SIGNATURE};
use crate::Config;

/// Defaults, with the database and image root inside `dir`
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.database.path = dir.join("db/gallery.db").to_string_lossy().into_owned();
    config.images.root = dir.join("images").to_string_lossy().into_owned();
    config
}

/// 1x1 greyscale header
fn ihdr() -> (ChunkType, Vec<u8>) {
    let mut data = Vec::new();
    data.extend_from_slice(&1u32.to_be_bytes());
    data.extend_from_slice(&1u32.to_be_bytes());
    data.extend_from_slice(&[8, 0, 0, 0, 0]);
    (ChunkType::IHDR, data)
}

pub fn raw_chunk(chunk_type: ChunkType, data: Vec<u8>) -> (ChunkType, Vec<u8>) {
    (chunk_type, data)
}

pub fn text_chunk(key: &str, value: &str) -> (ChunkType, Vec<u8>) {
    let mut data = key.as_bytes().to_vec();
    data.push(0);
    data.extend_from_slice(value.as_bytes());
    (ChunkType::TEXT, data)
}

pub fn ztxt_chunk(key: &str, value: &str) -> (ChunkType, Vec<u8>) {
    let mut data = key.as_bytes().to_vec();
    data.extend_from_slice(&[0, 0]);
    data.extend_from_slice(&deflate(value.as_bytes()));
    (ChunkType::ZTXT, data)
}

pub fn itxt_chunk(key: &str, value: &str, compressed: bool) -> (ChunkType, Vec<u8>) {
    let mut data = key.as_bytes().to_vec();
    data.push(0);
    data.extend_from_slice(&[u8::from(compressed), 0]);
    // empty language tag and translated keyword
    data.extend_from_slice(&[0, 0]);
    if compressed {
        data.extend_from_slice(&deflate(value.as_bytes()));
    } else {
        data.extend_from_slice(value.as_bytes());
    }
    (ChunkType::ITXT, data)
}

fn deflate(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

fn push_chunk(out: &mut Vec<u8>, chunk_type: ChunkType, data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&chunk_type.0);
    out.extend_from_slice(data);
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&chunk_type.0);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Signature, IHDR, the given chunks, IEND. No pixel data: the readers
/// under test never look at it.
pub fn encode_png(chunks: &[(ChunkType, Vec<u8>)]) -> Vec<u8> {
    let mut out = PNG_SIGNATURE.to_vec();
    let (ihdr_type, ihdr_data) = ihdr();
    push_chunk(&mut out, ihdr_type, &ihdr_data);
    for (chunk_type, data) in chunks {
        push_chunk(&mut out, *chunk_type, data);
    }
    push_chunk(&mut out, ChunkType::IEND, &[]);
    out
}

/// Write a PNG under `root`, creating parent directories
pub fn write_png(root: &Path, relative: &str, chunks: &[(ChunkType, Vec<u8>)]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, encode_png(chunks)).unwrap();
    path
}
