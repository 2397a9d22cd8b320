use std::io::Write;

use super::{
    errors::{LoadError, VmError},
    exec::{self, RunConfig, RunReport, StepOutcome},
    memory::Ram,
    registers::Cpu,
};

pub const MEMORY_SIZE: usize = 256;
pub const REGISTERS_LEN: usize = 8;

/// R7 doubles as the stack pointer.
pub const SP: usize = 7;
/// Empty-stack value of SP. The stack grows down from here.
pub const STACK_TOP: u8 = 0xF4;

pub const FL_EQUAL: u8 = 0b0000_0001;
pub const FL_GREATER: u8 = 0b0000_0010;
pub const FL_LESS: u8 = 0b0000_0100;

// Opcodes: AABCDDDD, AA = operand count, B = ALU op, C = sets PC.
pub const OPC_HLT: u8 = 0b0000_0001;
pub const OPC_RET: u8 = 0b0001_0001;
pub const OPC_PUSH: u8 = 0b0100_0101;
pub const OPC_POP: u8 = 0b0100_0110;
pub const OPC_PRN: u8 = 0b0100_0111;
pub const OPC_CALL: u8 = 0b0101_0000;
pub const OPC_JMP: u8 = 0b0101_0100;
pub const OPC_JEQ: u8 = 0b0101_0101;
pub const OPC_JNE: u8 = 0b0101_0110;
pub const OPC_LDI: u8 = 0b1000_0010;
pub const OPC_ADD: u8 = 0b1010_0000;
pub const OPC_MUL: u8 = 0b1010_0010;
pub const OPC_CMP: u8 = 0b1010_0111;

/// A complete LS-8 machine: register file, program state and memory.
#[derive(Clone, Default)]
pub struct Machine {
    pub cpu: Cpu,
    pub mem: Ram,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes memory and registers, points PC at 0 and SP at the stack top.
    pub fn reset(&mut self) {
        self.cpu = Cpu::default();
        self.mem.clear();
        tracing::debug!("machine reset");
    }

    /// Copies a program image into memory starting at address 0.
    pub fn load(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > MEMORY_SIZE {
            return Err(LoadError::ImageTooLarge { len: program.len() });
        }
        for (addr, &b) in program.iter().enumerate() {
            self.mem
                .write(addr, b)
                .map_err(|_| LoadError::ImageTooLarge { len: program.len() })?;
        }
        tracing::debug!(bytes = program.len(), "program loaded");
        Ok(())
    }

    pub fn step(&mut self, out: &mut impl Write) -> Result<StepOutcome, VmError> {
        exec::step(&mut self.cpu, &mut self.mem, out)
    }

    /// Runs until HLT with no step limit.
    pub fn run(&mut self, out: &mut impl Write) -> Result<RunReport, VmError> {
        self.run_with(out, &RunConfig::default())
    }

    pub fn run_with(
        &mut self,
        out: &mut impl Write,
        config: &RunConfig,
    ) -> Result<RunReport, VmError> {
        exec::run(&mut self.cpu, &mut self.mem, out, config)
    }

    /// One-line snapshot: PC, the three bytes at PC, then every register.
    pub fn trace(&self) -> String {
        exec::trace_line(&self.cpu, &self.mem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_places_bytes_from_zero() {
        let mut m = Machine::new();
        m.load(&[OPC_LDI, 0, 8, OPC_HLT]).unwrap();
        assert_eq!(&m.mem.as_slice()[..5], &[OPC_LDI, 0, 8, OPC_HLT, 0]);
    }

    #[test]
    fn oversized_image_rejected() {
        let mut m = Machine::new();
        let image = vec![OPC_HLT; MEMORY_SIZE + 1];
        assert!(matches!(
            m.load(&image),
            Err(LoadError::ImageTooLarge { len: 257 })
        ));
        assert!(m.load(&image[..MEMORY_SIZE]).is_ok());
    }

    #[test]
    fn reset_clears_everything() {
        let mut m = Machine::new();
        m.load(&[OPC_LDI, 0, 8]).unwrap();
        m.cpu.reg[0] = 9;
        m.cpu.pc = 3;
        m.cpu.fl = FL_LESS;
        m.reset();
        assert!(m.mem.as_slice().iter().all(|&b| b == 0));
        assert_eq!(m.cpu, Cpu::default());
        assert_eq!(m.cpu.sp(), STACK_TOP);
    }

    #[test]
    fn trace_line() {
        let mut m = Machine::new();
        m.load(&[OPC_LDI, 1, 0x2A]).unwrap();
        assert_eq!(
            m.trace(),
            "00 | 82 01 2A | 00 00 00 00 00 00 00 F4"
        );
    }
}
