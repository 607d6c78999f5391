//! PNG container reader
//!
//! Yields the file's chunks as `(chunk_type, bytes)` pairs in file order. The
//! reader is lazy and single-pass: restarting means reopening the file.

use std::fmt;
use std::io::{self, Read};

use super::ExtractError;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Chunk lengths above 2^31 - 1 are invalid per the PNG format
const MAX_CHUNK_LEN: u32 = 0x7FFF_FFFF;

/// Four-byte chunk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    pub const IHDR: ChunkType = ChunkType(*b"IHDR");
    pub const IEND: ChunkType = ChunkType(*b"IEND");
    pub const TEXT: ChunkType = ChunkType(*b"tEXt");
    pub const ZTXT: ChunkType = ChunkType(*b"zTXt");
    pub const ITXT: ChunkType = ChunkType(*b"iTXt");
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

#[derive(Debug, Clone)]
pub struct Chunk {
    pub chunk_type: ChunkType,
    pub data: Vec<u8>,
}

/// Iterator over the chunks of a PNG stream
pub struct Chunks<R> {
    reader: R,
    done: bool,
}

impl<R: Read> Chunks<R> {
    /// Consume and check the signature, leaving the reader at the first chunk
    pub fn new(mut reader: R) -> Result<Self, ExtractError> {
        let mut signature = [0u8; 8];
        if fill(&mut reader, &mut signature)? != signature.len() || signature != PNG_SIGNATURE {
            return Err(ExtractError::NotPng);
        }
        Ok(Self {
            reader,
            done: false,
        })
    }

    fn read_chunk(&mut self) -> Result<Option<Chunk>, ExtractError> {
        let mut header = [0u8; 8];
        match fill(&mut self.reader, &mut header)? {
            // A stream that stops cleanly between chunks has no more chunks to give
            0 => return Ok(None),
            8 => {}
            _ => return Err(ExtractError::Truncated("chunk header".to_string())),
        }

        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let chunk_type = ChunkType([header[4], header[5], header[6], header[7]]);
        if length > MAX_CHUNK_LEN {
            return Err(ExtractError::ChunkTooLarge {
                chunk: chunk_type.to_string(),
                length,
            });
        }

        let mut data = Vec::new();
        (&mut self.reader)
            .take(u64::from(length))
            .read_to_end(&mut data)?;
        if data.len() != length as usize {
            return Err(ExtractError::Truncated(chunk_type.to_string()));
        }

        let mut crc = [0u8; 4];
        if fill(&mut self.reader, &mut crc)? != crc.len() {
            return Err(ExtractError::Truncated(chunk_type.to_string()));
        }

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&chunk_type.0);
        hasher.update(&data);
        if hasher.finalize() != u32::from_be_bytes(crc) {
            return Err(ExtractError::CrcMismatch(chunk_type.to_string()));
        }

        Ok(Some(Chunk { chunk_type, data }))
    }
}

impl<R: Read> Iterator for Chunks<R> {
    type Item = Result<Chunk, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_chunk() {
            Ok(Some(chunk)) => {
                if chunk.chunk_type == ChunkType::IEND {
                    self.done = true;
                }
                Some(Ok(chunk))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Read until `buf` is full or the stream ends, returning the bytes read
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
