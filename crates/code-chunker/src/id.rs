use crate::types::ChunkKind;
use sha2::{Digest, Sha256};
use std::fmt::Write;

pub const FILE_ID_PREFIX: &str = "file:";

/// Id of the file-level chunk for `path`.
#[must_use]
pub fn file_chunk_id(path: &str) -> String {
    format!("{FILE_ID_PREFIX}{path}")
}

/// Deterministic chunk id.
///
/// File chunks are keyed by path alone so re-indexing overwrites them. Every
/// other kind hashes `kind:path:name:line_start`, which keeps same-named
/// symbols apart across lines and files.
#[must_use]
pub fn generate_id(kind: ChunkKind, path: &str, name: &str, line_start: usize) -> String {
    if kind == ChunkKind::File {
        return file_chunk_id(path);
    }

    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(path.as_bytes());
    hasher.update(b":");
    hasher.update(name.as_bytes());
    hasher.update(b":");
    hasher.update(line_start.to_string().as_bytes());
    hex_encode_lower(&hasher.finalize())
}

fn hex_encode_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().saturating_mul(2));
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}
