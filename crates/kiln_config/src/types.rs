//! Configuration types deserialized from `kiln.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The top-level configuration parsed from `kiln.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct KilnConfig {
    /// Program binary cache settings.
    #[serde(default)]
    pub shader_cache: ShaderCacheConfig,
}

/// Settings for the compiled-shader binary cache.
///
/// Every field has a default, so an empty `[shader_cache]` table (or no table
/// at all) yields an enabled cache with diagnostics off.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ShaderCacheConfig {
    /// Whether program binaries are loaded from and saved to the cache.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether the driver info log of a rejected binary is fetched and logged.
    #[serde(default)]
    pub diagnostics: bool,

    /// Whether a save is skipped when the driver writes a different number of
    /// bytes than it reported as the binary length.
    #[serde(default = "default_true")]
    pub verify_written_length: bool,

    /// Cache root directory. Relative paths are resolved against the directory
    /// holding the configuration file.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for ShaderCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            diagnostics: false,
            verify_written_length: true,
            directory: None,
        }
    }
}

impl ShaderCacheConfig {
    /// Returns the cache root, resolving a relative `directory` against `base`.
    ///
    /// Returns `None` when no directory is configured; the embedding
    /// application then chooses a platform location itself.
    pub fn resolve_directory(&self, base: &Path) -> Option<PathBuf> {
        let dir = self.directory.as_ref()?;
        if dir.is_absolute() {
            Some(dir.clone())
        } else {
            Some(base.join(dir))
        }
    }
}
