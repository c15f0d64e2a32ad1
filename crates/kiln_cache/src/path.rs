//! Mapping of `(artifact type, key)` pairs to storage locations.

use std::path::{Path, PathBuf};

use kiln_common::{ArtifactType, CacheKey};

/// File extension of a persisted cache entry.
pub const ENTRY_EXT: &str = "dat";

/// Resolves where the entry for an `(artifact type, key)` pair is stored.
///
/// The mapping must be a pure function: the same pair always resolves to the
/// same location, and distinct pairs to distinct locations. Platform policy
/// such as storage quotas belongs to the implementor.
pub trait CachePathResolver {
    /// Returns the storage location for the given pair.
    fn resolve_cache_path(&self, artifact_type: ArtifactType, key: &CacheKey) -> PathBuf;
}

impl<F> CachePathResolver for F
where
    F: Fn(ArtifactType, &CacheKey) -> PathBuf,
{
    fn resolve_cache_path(&self, artifact_type: ArtifactType, key: &CacheKey) -> PathBuf {
        self(artifact_type, key)
    }
}

/// The stock layout: `<root>/<artifact type>/<key>.dat`.
#[derive(Debug, Clone)]
pub struct DirectoryLayout {
    root: PathBuf,
}

impl DirectoryLayout {
    /// Creates a layout rooted at the given cache directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CachePathResolver for DirectoryLayout {
    fn resolve_cache_path(&self, artifact_type: ArtifactType, key: &CacheKey) -> PathBuf {
        self.root
            .join(artifact_type.as_str())
            .join(format!("{key}.{ENTRY_EXT}"))
    }
}
