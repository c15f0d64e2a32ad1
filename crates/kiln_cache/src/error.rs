//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// The public cache operations are fail-safe: every error here ends up as a
/// cache miss or a skipped save rather than a hard failure. This enum carries
/// the reason through the subsystem so it can be logged.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A cache key could not be derived for the request.
    #[error("cache key unavailable: {reason}")]
    HashUnavailable {
        /// Why no key could be computed.
        reason: String,
    },

    /// An I/O error occurred while reading or writing a cache entry.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The entry file is shorter than its fixed-size header.
    #[error("truncated entry header in {path}")]
    TruncatedHeader {
        /// The entry file path.
        path: PathBuf,
    },

    /// The payload length disagrees with the length declared in the header.
    #[error("payload length mismatch in {path}: header declares {declared}, found {actual}")]
    LengthMismatch {
        /// The entry file path.
        path: PathBuf,
        /// Length declared by the header.
        declared: i32,
        /// Length actually available.
        actual: u64,
    },

    /// The entry holds no payload bytes.
    #[error("empty payload in {path}")]
    EmptyPayload {
        /// The entry file path.
        path: PathBuf,
    },

    /// The entry header could not be encoded or decoded.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// The driver did not link the program after installing a cached binary.
    #[error("driver rejected cached program binary")]
    IncompatibleBinary {
        /// The driver's info log, when diagnostics are enabled.
        info_log: Option<String>,
    },

    /// The driver has no binary for the linked program.
    #[error("driver reported no program binary (length {length})")]
    BinaryUnavailable {
        /// Length returned by the binary length query.
        length: i32,
    },

    /// The driver wrote a different number of bytes than it reported.
    #[error("driver reported a {queried}-byte program binary but wrote {written} bytes")]
    WrittenLengthMismatch {
        /// Length returned by the binary length query.
        queried: i32,
        /// Length reported by the retrieval call.
        written: i32,
    },
}

impl CacheError {
    /// Builds an [`CacheError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error describes an absent or structurally
    /// invalid entry, as opposed to a failure to persist one.
    pub fn is_miss(&self) -> bool {
        match self {
            CacheError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            CacheError::TruncatedHeader { .. }
            | CacheError::LengthMismatch { .. }
            | CacheError::EmptyPayload { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::io(
            "/tmp/cache/shader/abc.dat",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("abc.dat"));
        assert!(!err.is_miss());
    }

    #[test]
    fn not_found_is_miss() {
        let err = CacheError::io(
            "missing.dat",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.is_miss());
    }

    #[test]
    fn length_mismatch_display() {
        let err = CacheError::LengthMismatch {
            path: PathBuf::from("entry.dat"),
            declared: 12,
            actual: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("header declares 12"));
        assert!(msg.contains("found 0"));
        assert!(err.is_miss());
    }

    #[test]
    fn structural_errors_are_misses() {
        assert!(CacheError::TruncatedHeader {
            path: PathBuf::from("a.dat")
        }
        .is_miss());
        assert!(CacheError::EmptyPayload {
            path: PathBuf::from("a.dat")
        }
        .is_miss());
    }

    #[test]
    fn incompatible_binary_display() {
        let bare = CacheError::IncompatibleBinary { info_log: None };
        assert_eq!(bare.to_string(), "driver rejected cached program binary");

        let logged = CacheError::IncompatibleBinary {
            info_log: Some("format 7 unsupported".to_string()),
        };
        assert_eq!(logged.to_string(), "driver rejected cached program binary");
        assert!(!logged.is_miss());
    }

    #[test]
    fn written_length_mismatch_display() {
        let err = CacheError::WrittenLengthMismatch {
            queried: 64,
            written: 60,
        };
        assert_eq!(
            err.to_string(),
            "driver reported a 64-byte program binary but wrote 60 bytes"
        );
    }

    #[test]
    fn binary_unavailable_display() {
        let err = CacheError::BinaryUnavailable { length: 0 };
        assert_eq!(err.to_string(), "driver reported no program binary (length 0)");
    }

    #[test]
    fn hash_unavailable_display() {
        let err = CacheError::HashUnavailable {
            reason: "no shading language version".to_string(),
        };
        assert!(err.to_string().contains("no shading language version"));
        assert!(!err.is_miss());
    }
}
