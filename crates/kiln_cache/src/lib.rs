//! Compiled-shader program binary cache.
//!
//! Linking a shader program from source is expensive, so the binary a driver
//! produces for a linked program is persisted under a content hash of the
//! shader sources and the driver's shading-language version. On later runs the
//! binary is installed straight into the program object, and the driver's link
//! status decides whether it was accepted. Every failure along the way turns
//! into a cache miss: the caller compiles from source, exactly as it would
//! without a cache.
//!
//! The crate is layered bottom-up:
//!
//! - [`hasher`] derives the [`CacheKey`] for a pair of shader sources.
//! - [`store`] reads and writes framed entries through a [`CachePathResolver`].
//! - [`facade`] drives a [`GraphicsProgramApi`] to install and capture binaries.
//! - [`link`] runs the whole lookup, compile and save sequence for one program.

#![warn(missing_docs)]

pub mod driver;
pub mod error;
pub mod facade;
pub mod hasher;
pub mod link;
pub mod path;
pub mod store;

pub use driver::{GraphicsProgramApi, ProgramHandle, RetrievedBinary};
pub use error::CacheError;
pub use facade::{CacheSettings, ShaderCache, DEFAULT_CACHE_DIR};
pub use hasher::compute_hash;
pub use kiln_common::{ArtifactType, CacheKey};
pub use link::LinkOutcome;
pub use path::{CachePathResolver, DirectoryLayout, ENTRY_EXT};
pub use store::{CacheEntry, CacheStore, EntryHeader, HEADER_SIZE};
