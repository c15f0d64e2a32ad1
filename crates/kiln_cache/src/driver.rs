//! The graphics driver surface the cache consumes.
//!
//! The cache never talks to a graphics API directly. Everything it needs from
//! the driver goes through [`GraphicsProgramApi`], which an embedding renderer
//! implements over its own context and tests implement with a fake.

use std::fmt;

/// Driver name of a program object, such as a GL program id.
///
/// The handle is borrowed for the duration of a call; the cache never creates,
/// retains or deletes program objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

impl fmt::Display for ProgramHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program#{}", self.0)
    }
}

/// What the driver reports after copying a program binary out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievedBinary {
    /// Number of bytes the driver actually wrote into the buffer.
    pub written_length: i32,

    /// Driver-specific format tag of the binary.
    pub binary_format: u32,
}

/// Program-binary operations of a graphics driver.
///
/// All calls happen on the thread that owns the graphics context.
pub trait GraphicsProgramApi {
    /// The shading-language version string of the current context, or `None`
    /// when the driver cannot report one.
    fn shading_language_version(&self) -> Option<String>;

    /// Length in bytes of the linked program's binary. Zero when the driver
    /// cannot produce one.
    fn program_binary_length(&self, program: ProgramHandle) -> i32;

    /// Copies the linked program's binary into `buffer`.
    fn get_program_binary(&self, program: ProgramHandle, buffer: &mut [u8]) -> RetrievedBinary;

    /// Installs a binary into a program object.
    ///
    /// The driver either links the program from the binary or leaves it in a
    /// link-failed state; [`GraphicsProgramApi::link_status`] tells which.
    fn program_binary(&mut self, program: ProgramHandle, binary_format: u32, binary: &[u8]);

    /// Whether the program object is currently linked.
    fn link_status(&self, program: ProgramHandle) -> bool;

    /// The program's info log, if the driver has one.
    fn program_info_log(&self, program: ProgramHandle) -> Option<String>;
}

impl<G: GraphicsProgramApi + ?Sized> GraphicsProgramApi for &mut G {
    fn shading_language_version(&self) -> Option<String> {
        (**self).shading_language_version()
    }

    fn program_binary_length(&self, program: ProgramHandle) -> i32 {
        (**self).program_binary_length(program)
    }

    fn get_program_binary(&self, program: ProgramHandle, buffer: &mut [u8]) -> RetrievedBinary {
        (**self).get_program_binary(program, buffer)
    }

    fn program_binary(&mut self, program: ProgramHandle, binary_format: u32, binary: &[u8]) {
        (**self).program_binary(program, binary_format, binary)
    }

    fn link_status(&self, program: ProgramHandle) -> bool {
        (**self).link_status(program)
    }

    fn program_info_log(&self, program: ProgramHandle) -> Option<String> {
        (**self).program_info_log(program)
    }
}
