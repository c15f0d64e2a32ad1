//! Content-derived keys naming cached program binaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a cache key digest in bytes (160 bits).
pub const KEY_LEN: usize = 20;

/// Length of the hex representation of a cache key.
pub const KEY_HEX_LEN: usize = KEY_LEN * 2;

/// A 160-bit content fingerprint identifying one cached artifact.
///
/// Two keys are equal exactly when their digests are equal. The key carries no
/// meaning beyond identity: it says nothing about whether two shader programs
/// are semantically equivalent. Its lowercase hex form is used verbatim as the
/// on-disk artifact name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey([u8; KEY_LEN]);

impl CacheKey {
    /// Wraps a finished digest.
    pub fn from_digest(digest: [u8; KEY_LEN]) -> Self {
        Self(digest)
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Returns the lowercase 40-character hex form of the key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({}..)", hex::encode(&self.0[..4]))
    }
}

/// Errors produced when parsing a [`CacheKey`] from its hex form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseKeyError {
    /// The string does not have exactly [`KEY_HEX_LEN`] characters.
    #[error("cache key must be 40 hex characters, got {0}")]
    Length(usize),

    /// The string contains a non-hex character.
    #[error("cache key is not valid hex: {0}")]
    Hex(String),
}

impl FromStr for CacheKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != KEY_HEX_LEN {
            return Err(ParseKeyError::Length(s.len()));
        }
        let mut digest = [0u8; KEY_LEN];
        hex::decode_to_slice(s, &mut digest).map_err(|e| ParseKeyError::Hex(e.to_string()))?;
        Ok(Self(digest))
    }
}
