pub mod alu;
pub mod arch;
pub mod errors;
pub mod exec;
pub mod instruction;
pub mod memory;
pub mod registers;

pub mod decoder;
pub mod encoder;

pub mod asm;
pub mod program;

pub use arch::Machine;
pub use errors::{Fault, LoadError, VmError};
pub use exec::{HaltReason, RunConfig, RunReport, StepOutcome};
pub use instruction::Instruction;
pub use memory::Ram;
pub use registers::Cpu;
