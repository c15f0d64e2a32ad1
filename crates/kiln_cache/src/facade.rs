//! Shader cache facade tying key derivation, storage and the driver together.
//!
//! [`ShaderCache`] owns the driver capability and the entry store. Loading a
//! cached binary is only a request to the driver: the program's link status
//! afterwards is the sole success signal, because binaries are specific to a
//! driver build and GPU family and go stale silently when either changes.

use std::path::Path;

use kiln_common::{ArtifactType, CacheKey};
use kiln_config::ShaderCacheConfig;
use tracing::{debug, warn};

use crate::driver::{GraphicsProgramApi, ProgramHandle};
use crate::error::CacheError;
use crate::hasher::compute_hash;
use crate::path::{CachePathResolver, DirectoryLayout};
use crate::store::{CacheEntry, CacheStore, EntryHeader};

/// Cache directory used when the configuration names none.
pub const DEFAULT_CACHE_DIR: &str = ".kiln-cache";

/// Runtime switches for a [`ShaderCache`], fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// When `false`, loads always miss and saves are no-ops that succeed.
    pub enabled: bool,

    /// Fetch and log the driver info log when a cached binary is rejected.
    pub diagnostics: bool,

    /// Skip a save when the driver writes fewer or more bytes than the binary
    /// length it reported.
    pub verify_written_length: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            diagnostics: false,
            verify_written_length: true,
        }
    }
}

impl From<&ShaderCacheConfig> for CacheSettings {
    fn from(config: &ShaderCacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            diagnostics: config.diagnostics,
            verify_written_length: config.verify_written_length,
        }
    }
}

/// Loads program binaries from, and saves them to, a [`CacheStore`].
///
/// Every operation reports a plain boolean. Misses, corrupt entries, rejected
/// binaries and failed saves are all absorbed here; the only visible cost of a
/// failure is that the caller compiles from source.
pub struct ShaderCache<G, R = DirectoryLayout> {
    driver: G,
    store: CacheStore<R>,
    settings: CacheSettings,
}

impl<G: GraphicsProgramApi> ShaderCache<G, DirectoryLayout> {
    /// Builds a cache from a `[shader_cache]` configuration section.
    ///
    /// A relative `directory` resolves against `base`; without one, entries go
    /// to [`DEFAULT_CACHE_DIR`] under `base`.
    pub fn from_config(driver: G, config: &ShaderCacheConfig, base: &Path) -> Self {
        let root = config
            .resolve_directory(base)
            .unwrap_or_else(|| base.join(DEFAULT_CACHE_DIR));
        Self::new(
            driver,
            CacheStore::new(DirectoryLayout::new(root)),
            CacheSettings::from(config),
        )
    }
}

impl<G: GraphicsProgramApi, R: CachePathResolver> ShaderCache<G, R> {
    /// Creates a cache over the given driver and store.
    pub fn new(driver: G, store: CacheStore<R>, settings: CacheSettings) -> Self {
        Self {
            driver,
            store,
            settings,
        }
    }

    /// Returns the driver.
    pub fn driver(&self) -> &G {
        &self.driver
    }

    /// Returns the driver mutably.
    pub fn driver_mut(&mut self) -> &mut G {
        &mut self.driver
    }

    /// Returns the entry store.
    pub fn store(&self) -> &CacheStore<R> {
        &self.store
    }

    /// Returns the settings the cache was built with.
    pub fn settings(&self) -> CacheSettings {
        self.settings
    }

    /// Derives the key for a source pair under the driver's current
    /// shading-language version.
    ///
    /// Returns `None` when no key can be computed; the caller then neither
    /// loads nor saves for this program.
    pub fn cache_key(&self, vertex_source: &[u8], fragment_source: &[u8]) -> Option<CacheKey> {
        let key = self
            .driver
            .shading_language_version()
            .ok_or_else(|| CacheError::HashUnavailable {
                reason: "driver reported no shading language version".to_string(),
            })
            .and_then(|version| compute_hash(vertex_source, fragment_source, &version));
        match key {
            Ok(key) => Some(key),
            Err(err) => {
                debug!(error = %err, "caching disabled for this program");
                None
            }
        }
    }

    /// Installs the cached binary for `key` into `program`.
    ///
    /// Returns `true` only if an entry exists and the driver reports the
    /// program linked afterwards. On `false` the program may be left in a
    /// link-failed state, which a compile from source replaces.
    pub fn try_load(
        &mut self,
        program: ProgramHandle,
        artifact_type: ArtifactType,
        key: &CacheKey,
    ) -> bool {
        if !self.settings.enabled {
            return false;
        }
        let Some(entry) = self.store.load(artifact_type, key) else {
            return false;
        };

        match self.install(program, &entry) {
            Ok(()) => {
                debug!(key = %key, program = %program, "loaded program binary from cache");
                true
            }
            Err(CacheError::IncompatibleBinary {
                info_log: Some(info_log),
            }) => {
                warn!(
                    key = %key,
                    program = %program,
                    info_log = %info_log,
                    "driver rejected cached program binary"
                );
                false
            }
            Err(err) => {
                debug!(
                    key = %key,
                    program = %program,
                    error = %err,
                    "cached binary not used"
                );
                false
            }
        }
    }

    /// Captures the linked binary of `program` and stores it under `key`.
    ///
    /// Returns whether the entry was written. No retry is attempted. With
    /// caching disabled this does nothing and returns `true`.
    pub fn try_save(
        &self,
        program: ProgramHandle,
        artifact_type: ArtifactType,
        key: &CacheKey,
    ) -> bool {
        if !self.settings.enabled {
            return true;
        }

        let saved = self
            .capture(program)
            .and_then(|entry| self.store.save(artifact_type, key, &entry.header, &entry.payload));
        match saved {
            Ok(()) => true,
            Err(err @ CacheError::Io { .. }) => {
                warn!(
                    key = %key,
                    program = %program,
                    error = %err,
                    "failed to persist program binary"
                );
                false
            }
            Err(err) => {
                debug!(
                    key = %key,
                    program = %program,
                    error = %err,
                    "program binary not cached"
                );
                false
            }
        }
    }

    fn install(&mut self, program: ProgramHandle, entry: &CacheEntry) -> Result<(), CacheError> {
        let format = entry.header.binary_format;
        self.driver.program_binary(program, format, &entry.payload);
        if self.driver.link_status(program) {
            return Ok(());
        }

        let info_log = if self.settings.diagnostics {
            self.driver
                .program_info_log(program)
                .filter(|log| !log.is_empty())
        } else {
            None
        };
        Err(CacheError::IncompatibleBinary { info_log })
    }

    fn capture(&self, program: ProgramHandle) -> Result<CacheEntry, CacheError> {
        let queried = self.driver.program_binary_length(program);
        let length = usize::try_from(queried)
            .ok()
            .filter(|&len| len > 0)
            .ok_or(CacheError::BinaryUnavailable { length: queried })?;

        let mut payload = vec![0u8; length];
        let retrieved = self.driver.get_program_binary(program, &mut payload);

        if self.settings.verify_written_length && retrieved.written_length != queried {
            return Err(CacheError::WrittenLengthMismatch {
                queried,
                written: retrieved.written_length,
            });
        }

        Ok(CacheEntry {
            header: EntryHeader {
                program_length: queried,
                binary_format: retrieved.binary_format,
            },
            payload,
        })
    }
}
