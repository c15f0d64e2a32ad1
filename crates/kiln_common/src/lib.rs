//! Shared foundational types used across the Kiln shader cache.
//!
//! This crate provides the content-derived [`CacheKey`] that names every cached
//! artifact and the [`ArtifactType`] tag that partitions the cache namespace.

#![warn(missing_docs)]

pub mod artifact;
pub mod key;

pub use artifact::ArtifactType;
pub use key::{CacheKey, ParseKeyError, KEY_HEX_LEN, KEY_LEN};
