//! Binary container (GLB) chunk splitting.
//!
//! Layout:
//!
//! ```text
//! 0..12    header: magic, version, total length (u32 LE each, not validated)
//! 12..20   document chunk header: length, type
//! 20..     document text (length bytes)
//! then     binary chunk header (8 bytes, skipped) and payload to end of file
//! ```

use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;

/// Size of the fixed file header.
pub const HEADER_LEN: usize = 12;

/// Size of each chunk's length + type sub-header.
pub const CHUNK_HEADER_LEN: usize = 8;

/// `glTF` in little-endian byte order.
pub const GLTF_MAGIC: u32 = u32::from_le_bytes(*b"glTF");

/// Errors in the container framing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("wrong extension, expected a .glb file: {0}")]
    WrongExtension(PathBuf),

    #[error("file too short for container header ({len} bytes, need {})", HEADER_LEN)]
    TooShort { len: usize },

    #[error("truncated chunk header at byte {offset} (file is {file_len} bytes)")]
    TruncatedChunkHeader { offset: usize, file_len: usize },

    #[error("document chunk of {length} bytes at byte {offset} overruns file ({file_len} bytes)")]
    ChunkOutOfBounds {
        offset: usize,
        length: usize,
        file_len: usize,
    },

    #[error("binary chunk offset {offset} is past end of file ({file_len} bytes)")]
    MissingBinaryChunk { offset: usize, file_len: usize },

    #[error("document chunk is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),
}

/// Fixed file header. Read but never checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlbHeader {
    pub magic: u32,
    pub version: u32,
    pub length: u32,
}

impl GlbHeader {
    /// True when the magic field reads `glTF`.
    pub fn has_gltf_magic(&self) -> bool {
        self.magic == GLTF_MAGIC
    }
}

/// A chunk's length + type sub-header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    pub length: u32,
    pub kind: u32,
}

/// A split container: document text plus the raw binary payload.
#[derive(Clone, Debug)]
pub struct Container {
    pub header: GlbHeader,
    pub document_chunk: ChunkHeader,
    pub binary_chunk: ChunkHeader,
    pub document: String,
    pub blob: Vec<u8>,
}

impl Container {
    /// Give up the header info and keep `(document, blob)`.
    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.document, self.blob)
    }
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_chunk_header(data: &[u8], offset: usize) -> Result<ChunkHeader, FormatError> {
    let truncated = || FormatError::TruncatedChunkHeader {
        offset,
        file_len: data.len(),
    };
    Ok(ChunkHeader {
        length: read_u32(data, offset).ok_or_else(truncated)?,
        kind: read_u32(data, offset + 4).ok_or_else(truncated)?,
    })
}

/// Split raw container bytes into document text and binary payload.
pub fn read_container(data: &[u8]) -> Result<Container, FormatError> {
    if data.len() < HEADER_LEN {
        return Err(FormatError::TooShort { len: data.len() });
    }

    let header = GlbHeader {
        magic: read_u32(data, 0).unwrap_or_default(),
        version: read_u32(data, 4).unwrap_or_default(),
        length: read_u32(data, 8).unwrap_or_default(),
    };

    let document_chunk = read_chunk_header(data, HEADER_LEN)?;
    let text_start = HEADER_LEN + CHUNK_HEADER_LEN;
    let text_len = document_chunk.length as usize;
    let text_end = text_start + text_len;
    if text_end > data.len() {
        return Err(FormatError::ChunkOutOfBounds {
            offset: text_start,
            length: text_len,
            file_len: data.len(),
        });
    }

    let binary_offset = text_end;
    if binary_offset >= data.len() {
        return Err(FormatError::MissingBinaryChunk {
            offset: binary_offset,
            file_len: data.len(),
        });
    }
    let binary_chunk = read_chunk_header(data, binary_offset)?;

    let document = std::str::from_utf8(&data[text_start..text_end])?.to_string();
    let blob = data[binary_offset + CHUNK_HEADER_LEN..].to_vec();

    log::debug!(
        "Container v{}: {} byte document, {} byte payload",
        header.version,
        document.len(),
        blob.len()
    );

    Ok(Container {
        header,
        document_chunk,
        binary_chunk,
        document,
        blob,
    })
}

/// Assemble container bytes from a document and a payload.
///
/// This is the inverse of [`read_container`]; the document is padded with
/// spaces and the payload with zeros to 4-byte alignment.
pub fn write_container(document: &str, blob: &[u8]) -> Vec<u8> {
    let text_len = document.len().next_multiple_of(4);
    let blob_len = blob.len().next_multiple_of(4);
    let total = HEADER_LEN + 2 * CHUNK_HEADER_LEN + text_len + blob_len;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLTF_MAGIC.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    out.extend_from_slice(&(text_len as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(document.as_bytes());
    out.resize(HEADER_LEN + CHUNK_HEADER_LEN + text_len, b' ');

    out.extend_from_slice(&(blob_len as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(blob);
    out.resize(total, 0);
    out
}
