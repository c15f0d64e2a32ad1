//! On-disk storage of program binary entries.
//!
//! Each entry is one file holding a fixed 8-byte header followed by the opaque
//! driver payload:
//!
//! | Offset | Field            | Encoding |
//! |--------|------------------|----------|
//! | 0      | `program_length` | `i32` LE |
//! | 4      | `binary_format`  | `u32` LE |
//! | 8      | payload          | `program_length` bytes |
//!
//! Reads are fail-safe: a missing, truncated, or inconsistent file is a cache
//! miss, never an error surfaced to the caller.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use kiln_common::{ArtifactType, CacheKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::path::CachePathResolver;

/// Size of the encoded [`EntryHeader`] in bytes.
pub const HEADER_SIZE: usize = 8;

/// Header written in front of every cached program binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryHeader {
    /// Payload length in bytes, as reported by the driver at capture time.
    pub program_length: i32,

    /// Driver-specific binary format tag, replayed verbatim on load.
    pub binary_format: u32,
}

impl EntryHeader {
    /// Encodes the header as fixed-width little-endian integers.
    pub fn encode(&self) -> Result<Vec<u8>, CacheError> {
        let bytes = bincode::serde::encode_to_vec(self, bincode::config::legacy()).map_err(
            |e| CacheError::Serialization {
                reason: e.to_string(),
            },
        )?;
        if bytes.len() != HEADER_SIZE {
            return Err(CacheError::Serialization {
                reason: format!("encoded header is {} bytes, expected {HEADER_SIZE}", bytes.len()),
            });
        }
        Ok(bytes)
    }

    /// Decodes a header from exactly [`HEADER_SIZE`] bytes.
    pub fn decode(bytes: &[u8; HEADER_SIZE]) -> Result<Self, CacheError> {
        bincode::serde::decode_from_slice(bytes, bincode::config::legacy())
            .map(|(header, _)| header)
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })
    }
}

/// A cached program binary together with its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The entry header.
    pub header: EntryHeader,

    /// The opaque program binary.
    pub payload: Vec<u8>,
}

/// Stores program binaries at locations chosen by a [`CachePathResolver`].
///
/// A later save for the same `(artifact type, key)` pair replaces the earlier
/// entry. Nothing is ever deleted by the store.
#[derive(Debug, Clone)]
pub struct CacheStore<R> {
    resolver: R,
}

impl<R: CachePathResolver> CacheStore<R> {
    /// Creates a store that places entries where `resolver` says.
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Returns the path resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Writes an entry, replacing any previous entry for the same pair.
    ///
    /// The header and payload are written as two sequential writes and the
    /// save succeeds only if both complete in full. A failed save may leave a
    /// truncated file behind; [`CacheStore::load`] rejects such files.
    ///
    /// The parent directory is created only when opening the file reports it
    /// missing, so an open that fails for any other reason touches nothing.
    pub fn save(
        &self,
        artifact_type: ArtifactType,
        key: &CacheKey,
        header: &EntryHeader,
        payload: &[u8],
    ) -> Result<(), CacheError> {
        let path = self.resolver.resolve_cache_path(artifact_type, key);

        // Refuse to write an entry that could never be loaded back.
        if usize::try_from(header.program_length).ok() != Some(payload.len()) {
            return Err(CacheError::LengthMismatch {
                path,
                declared: header.program_length,
                actual: payload.len() as u64,
            });
        }
        let header_bytes = header.encode()?;

        let mut file = create_entry_file(&path)?;
        file.write_all(&header_bytes)
            .map_err(|e| CacheError::io(&path, e))?;
        file.write_all(payload).map_err(|e| CacheError::io(&path, e))?;

        debug!(
            key = %key,
            artifact_type = %artifact_type,
            bytes = payload.len(),
            "saved cache entry"
        );
        Ok(())
    }

    /// Reads the entry for a pair, validating its framing.
    ///
    /// Returns `None` if the file does not exist, its header is short, or the
    /// payload length disagrees with either the file size or the header. This
    /// is fail-safe: corruption results in a cache miss. Read failures other
    /// than a miss are also absorbed, but logged at `warn`.
    pub fn load(&self, artifact_type: ArtifactType, key: &CacheKey) -> Option<CacheEntry> {
        let path = self.resolver.resolve_cache_path(artifact_type, key);
        match read_entry(&path) {
            Ok(entry) => Some(entry),
            Err(err) if err.is_miss() => {
                debug!(
                    key = %key,
                    artifact_type = %artifact_type,
                    error = %err,
                    "cache entry not usable"
                );
                None
            }
            Err(err) => {
                warn!(
                    key = %key,
                    artifact_type = %artifact_type,
                    error = %err,
                    "failed to read cache entry"
                );
                None
            }
        }
    }
}

fn create_entry_file(path: &Path) -> Result<File, CacheError> {
    match File::create(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
            }
            File::create(path).map_err(|e| CacheError::io(path, e))
        }
        Err(e) => Err(CacheError::io(path, e)),
    }
}

fn read_entry(path: &Path) -> Result<CacheEntry, CacheError> {
    let mut file = File::open(path).map_err(|e| CacheError::io(path, e))?;

    let mut header_bytes = [0u8; HEADER_SIZE];
    file.read_exact(&mut header_bytes).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            CacheError::TruncatedHeader {
                path: path.to_path_buf(),
            }
        } else {
            CacheError::io(path, e)
        }
    })?;
    let header = EntryHeader::decode(&header_bytes)?;

    let file_len = file.metadata().map_err(|e| CacheError::io(path, e))?.len();
    let expected = file_len
        .checked_sub(HEADER_SIZE as u64)
        .ok_or_else(|| CacheError::TruncatedHeader {
            path: path.to_path_buf(),
        })?;

    let mut payload = Vec::new();
    let read = file
        .take(expected)
        .read_to_end(&mut payload)
        .map_err(|e| CacheError::io(path, e))? as u64;

    let declared = u64::try_from(header.program_length).ok();
    if read != expected || declared != Some(read) {
        return Err(CacheError::LengthMismatch {
            path: path.to_path_buf(),
            declared: header.program_length,
            actual: read,
        });
    }
    if payload.is_empty() {
        return Err(CacheError::EmptyPayload {
            path: path.to_path_buf(),
        });
    }

    Ok(CacheEntry { header, payload })
}
