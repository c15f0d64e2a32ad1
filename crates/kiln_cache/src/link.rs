//! One-call program linking with the binary cache in front of the compiler.

use kiln_common::{ArtifactType, CacheKey};
use tracing::debug;

use crate::driver::{GraphicsProgramApi, ProgramHandle};
use crate::facade::ShaderCache;
use crate::path::CachePathResolver;

/// How a program ended up linked, or why it did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The cached binary was installed and the driver linked it.
    Cached {
        /// Key of the entry that was used.
        key: CacheKey,
    },

    /// The program was compiled from source and linked.
    Compiled {
        /// Key the binary was saved under, if one could be computed.
        key: Option<CacheKey>,
        /// Whether the fresh binary was persisted.
        saved: bool,
    },

    /// The program did not link from source. Nothing was persisted.
    LinkFailed,
}

impl LinkOutcome {
    /// Returns `true` if the program is linked and ready to use.
    pub fn is_linked(&self) -> bool {
        !matches!(self, LinkOutcome::LinkFailed)
    }
}

impl<G: GraphicsProgramApi, R: CachePathResolver> ShaderCache<G, R> {
    /// Links `program`, preferring a cached binary over compiling from source.
    ///
    /// The key is derived from both sources and the driver's shading-language
    /// version. A hit whose binary the driver links finishes immediately.
    /// Otherwise `compile_from_source` compiles and links the program, and a
    /// successfully linked result is saved for next time. An error from
    /// `compile_from_source` is returned unchanged.
    pub fn link_program<F, E>(
        &mut self,
        program: ProgramHandle,
        vertex_source: &[u8],
        fragment_source: &[u8],
        compile_from_source: F,
    ) -> Result<LinkOutcome, E>
    where
        F: FnOnce(&mut G, ProgramHandle) -> Result<(), E>,
    {
        let artifact_type = ArtifactType::ShaderProgram;
        let key = if self.settings().enabled {
            self.cache_key(vertex_source, fragment_source)
        } else {
            None
        };

        if let Some(key) = key {
            if self.try_load(program, artifact_type, &key) {
                return Ok(LinkOutcome::Cached { key });
            }
        }

        compile_from_source(self.driver_mut(), program)?;
        if !self.driver().link_status(program) {
            debug!(program = %program, "program failed to link from source");
            return Ok(LinkOutcome::LinkFailed);
        }

        let saved = match key {
            Some(key) => self.try_save(program, artifact_type, &key),
            None => false,
        };
        Ok(LinkOutcome::Compiled { key, saved })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_link_failure_is_unlinked() {
        let key = CacheKey::from_digest([1; 20]);
        assert!(LinkOutcome::Cached { key }.is_linked());
        assert!(LinkOutcome::Compiled {
            key: None,
            saved: false
        }
        .is_linked());
        assert!(!LinkOutcome::LinkFailed.is_linked());
    }
}
