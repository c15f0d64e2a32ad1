//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating a `kiln.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML content could not be parsed into a configuration.
    #[error("invalid kiln.toml: {0}")]
    Parse(#[from] toml::de::Error),

    /// `shader_cache.directory` was given as an empty string.
    #[error("shader_cache.directory must not be empty")]
    EmptyCacheDirectory,
}
