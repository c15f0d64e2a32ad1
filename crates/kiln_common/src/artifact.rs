//! Artifact type tags partitioning the cache namespace.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The logical kind of a cached compiled artifact.
///
/// Entries are identified by `(ArtifactType, CacheKey)`. The tag selects the
/// storage area, so artifacts of different kinds never collide even when their
/// keys do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactType {
    /// A linked GPU shader program binary.
    #[serde(rename = "shader")]
    ShaderProgram,
}

impl ArtifactType {
    /// Returns the stable tag used in storage locations.
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactType::ShaderProgram => "shader",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
