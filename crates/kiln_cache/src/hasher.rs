//! Cache key derivation for shader program sources.
//!
//! A key is the SHA-1 digest of the vertex source, the fragment source and the
//! driver's shading-language version string, streamed in that order with no
//! separators. Including the version string means a driver upgrade that
//! changes the reported version produces fresh keys instead of stale hits.

use kiln_common::{CacheKey, KEY_LEN};
use sha1::{Digest, Sha1};

use crate::error::CacheError;

/// Computes the cache key for a vertex/fragment source pair.
///
/// Sources follow C-string rules: anything from the first NUL byte onward is
/// not part of the source, so a buffer that still carries its terminator
/// hashes the same as one that does not.
///
/// Returns [`CacheError::HashUnavailable`] when the shading-language version is
/// empty. Callers treat that as "no caching for this request" and skip both
/// load and save.
pub fn compute_hash(
    vertex_source: &[u8],
    fragment_source: &[u8],
    shading_language_version: &str,
) -> Result<CacheKey, CacheError> {
    let version = until_nul(shading_language_version.as_bytes());
    if version.is_empty() {
        return Err(CacheError::HashUnavailable {
            reason: "driver reported an empty shading language version".to_string(),
        });
    }

    let mut hasher = Sha1::new();
    hasher.update(until_nul(vertex_source));
    hasher.update(until_nul(fragment_source));
    hasher.update(version);

    let mut digest = [0u8; KEY_LEN];
    digest.copy_from_slice(&hasher.finalize());
    Ok(CacheKey::from_digest(digest))
}

fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const VERTEX: &[u8] = b"attribute vec4 a_position;\nvoid main() { gl_Position = a_position; }";
    const FRAGMENT: &[u8] = b"precision mediump float;\nvoid main() { gl_FragColor = vec4(1.0); }";
    const VERSION: &str = "OpenGL ES GLSL ES 1.00 (ANGLE 2.1)";

    #[test]
    fn matches_sha1_of_concatenation() {
        // SHA-1("abc")
        let key = compute_hash(b"a", b"b", "c").unwrap();
        assert_eq!(key.to_string(), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn deterministic() {
        let a = compute_hash(VERTEX, FRAGMENT, VERSION).unwrap();
        let b = compute_hash(VERTEX, FRAGMENT, VERSION).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string().len(), 40);
        assert!(a
            .to_string()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn every_single_byte_mutation_changes_key() {
        let base = compute_hash(VERTEX, FRAGMENT, VERSION).unwrap();
        let mut seen = HashSet::new();
        seen.insert(base);

        for i in 0..VERTEX.len() {
            let mut v = VERTEX.to_vec();
            v[i] = v[i].wrapping_add(1);
            assert!(seen.insert(compute_hash(&v, FRAGMENT, VERSION).unwrap()));
        }
        for i in 0..FRAGMENT.len() {
            let mut f = FRAGMENT.to_vec();
            f[i] = f[i].wrapping_add(1);
            assert!(seen.insert(compute_hash(VERTEX, &f, VERSION).unwrap()));
        }
        for i in 0..VERSION.len() {
            let mut bytes = VERSION.as_bytes().to_vec();
            bytes[i] = bytes[i].wrapping_add(1);
            let version = String::from_utf8(bytes).unwrap();
            assert!(seen.insert(compute_hash(VERTEX, FRAGMENT, &version).unwrap()));
        }
    }

    #[test]
    fn swapping_sources_changes_key() {
        let a = compute_hash(VERTEX, FRAGMENT, VERSION).unwrap();
        let b = compute_hash(FRAGMENT, VERTEX, VERSION).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn segment_boundaries_are_not_encoded() {
        // Segments are concatenated without separators.
        let a = compute_hash(b"ab", b"c", VERSION).unwrap();
        let b = compute_hash(b"a", b"bc", VERSION).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn trailing_nul_is_ignored() {
        let mut v = VERTEX.to_vec();
        v.push(0);
        v.extend_from_slice(b"garbage after terminator");
        let a = compute_hash(&v, FRAGMENT, VERSION).unwrap();
        let b = compute_hash(VERTEX, FRAGMENT, VERSION).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_version_is_unavailable() {
        let err = compute_hash(VERTEX, FRAGMENT, "").unwrap_err();
        assert!(matches!(err, CacheError::HashUnavailable { .. }));
    }
}
