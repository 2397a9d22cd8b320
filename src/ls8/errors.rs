use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while executing a program. Any of these ends the run.
#[derive(Error, Debug)]
pub enum VmError {
    /// The byte at `pc` is not in the opcode table.
    #[error("Unknown instruction at {pc}: {opcode}")]
    UnknownInstruction { pc: u8, opcode: u8 },

    /// A memory access or PC advance fell outside the 256-byte address space.
    #[error("Address out of bounds: {address}")]
    AddressOutOfBounds { address: usize },

    /// A register operand named a register that does not exist.
    #[error("Invalid register index: {index}")]
    InvalidRegister { index: u8 },

    /// PUSH or CALL with SP already at address 0.
    #[error("Stack overflow at {pc}")]
    StackOverflow { pc: u8 },

    /// The PRN output sink failed.
    #[error("Output error: {0}")]
    Output(#[from] io::Error),
}

/// Recoverable conditions: reported, then execution continues.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("error: no items in stack! (POP at {pc})")]
    StackUnderflow { pc: u8 },
}

/// Errors producing or installing a program image.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("error opening {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("program image is {len} bytes, memory holds 256")]
    ImageTooLarge { len: usize },
}
