//! In-memory graphics driver used by the integration tests.
//!
//! A "binary" produced by this driver is the GPU family tag followed by the
//! shader sources. Installing a binary links the program only when its format
//! tag and family prefix match the driver's own, which is how a binary captured
//! on another GPU goes stale.

#![allow(dead_code)]

use std::collections::HashMap;

use kiln_cache::{GraphicsProgramApi, ProgramHandle, RetrievedBinary};

pub const VERTEX: &[u8] = b"attribute vec4 a_position;\nvoid main() { gl_Position = a_position; }";
pub const FRAGMENT: &[u8] = b"precision mediump float;\nvoid main() { gl_FragColor = vec4(1.0); }";
pub const GLSL_ES_100: &str = "OpenGL ES GLSL ES 1.00";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeProgram {
    pub binary: Vec<u8>,
    pub format: u32,
    pub linked: bool,
    pub info_log: Option<String>,
}

#[derive(Debug)]
pub struct FakeDriver {
    pub version: Option<String>,
    pub gpu_format: u32,
    /// Bytes the driver silently drops when copying a binary out.
    pub short_write: usize,
    pub programs: HashMap<ProgramHandle, FakeProgram>,
    pub compiles: usize,
    pub installs: usize,
}

impl FakeDriver {
    pub fn new(version: &str, gpu_format: u32) -> Self {
        Self {
            version: Some(version.to_string()),
            gpu_format,
            short_write: 0,
            programs: HashMap::new(),
            compiles: 0,
            installs: 0,
        }
    }

    fn family_prefix(&self) -> Vec<u8> {
        format!("gpu{}:", self.gpu_format).into_bytes()
    }

    /// Compiles and links from source. An empty source fails to link.
    pub fn compile(&mut self, program: ProgramHandle, vertex: &[u8], fragment: &[u8]) {
        self.compiles += 1;
        let prefix = self.family_prefix();
        let format = self.gpu_format;
        let state = self.programs.entry(program).or_default();
        if vertex.is_empty() || fragment.is_empty() {
            *state = FakeProgram {
                info_log: Some("link error: missing shader stage".to_string()),
                ..Default::default()
            };
            return;
        }

        let mut binary = prefix;
        binary.extend_from_slice(vertex);
        binary.push(b'|');
        binary.extend_from_slice(fragment);
        *state = FakeProgram {
            binary,
            format,
            linked: true,
            info_log: None,
        };
    }

    pub fn program(&self, program: ProgramHandle) -> FakeProgram {
        self.programs.get(&program).cloned().unwrap_or_default()
    }
}

impl GraphicsProgramApi for FakeDriver {
    fn shading_language_version(&self) -> Option<String> {
        self.version.clone()
    }

    fn program_binary_length(&self, program: ProgramHandle) -> i32 {
        match self.programs.get(&program) {
            Some(p) if p.linked => p.binary.len() as i32,
            _ => 0,
        }
    }

    fn get_program_binary(&self, program: ProgramHandle, buffer: &mut [u8]) -> RetrievedBinary {
        let state = self.program(program);
        let available = state.binary.len().min(buffer.len());
        let written = available.saturating_sub(self.short_write);
        buffer[..written].copy_from_slice(&state.binary[..written]);
        RetrievedBinary {
            written_length: written as i32,
            binary_format: state.format,
        }
    }

    fn program_binary(&mut self, program: ProgramHandle, binary_format: u32, binary: &[u8]) {
        self.installs += 1;
        let accepted = binary_format == self.gpu_format && binary.starts_with(&self.family_prefix());
        let state = self.programs.entry(program).or_default();
        *state = if accepted {
            FakeProgram {
                binary: binary.to_vec(),
                format: binary_format,
                linked: true,
                info_log: None,
            }
        } else {
            FakeProgram {
                info_log: Some(format!("program binary format {binary_format} is not supported")),
                ..Default::default()
            }
        };
    }

    fn link_status(&self, program: ProgramHandle) -> bool {
        self.programs.get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: ProgramHandle) -> Option<String> {
        self.programs.get(&program).and_then(|p| p.info_log.clone())
    }
}
