// ls8/exec.rs
use std::io::Write;

use crate::ls8::{
    alu::{AluOp, alu},
    arch::STACK_TOP,
    decoder,
    errors::{Fault, VmError},
    instruction::Instruction,
    memory::Ram,
    registers::Cpu,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    Halted,
    /// The instruction was skipped with no state change; execution may continue.
    Faulted(Fault),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// HLT executed.
    Halted,
    /// `RunConfig::max_steps` instructions ran without reaching HLT.
    StepLimit,
}

#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub max_steps: Option<u64>,
    /// Emit a machine snapshot before every step on the `ls8::trace` target.
    pub trace: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub reason: HaltReason,
    pub steps: u64,
    pub faults: Vec<Fault>,
}

/// What an executed instruction asks the loop to do next.
enum Flow {
    /// `next_pc` overrides the sequential advance when set.
    Continue { next_pc: Option<u8> },
    Halt,
    Skip(Fault),
}

fn push(cpu: &mut Cpu, mem: &mut Ram, pc: u8, value: u8) -> Result<(), VmError> {
    let sp = cpu.sp().checked_sub(1).ok_or(VmError::StackOverflow { pc })?;
    mem.write(sp as usize, value)?;
    cpu.set_sp(sp);
    Ok(())
}

/// Reads the byte at SP and moves SP up one. SP wraps from 0xFF to 0 like the
/// 8-bit register it lives in.
fn pop(cpu: &mut Cpu, mem: &Ram) -> Result<u8, VmError> {
    let sp = cpu.sp();
    let value = mem.read(sp as usize)?;
    cpu.set_sp(sp.wrapping_add(1));
    Ok(value)
}

/// SP at the stack top sentinel, or cleared to 0 by the program.
#[inline]
fn stack_empty(cpu: &Cpu) -> bool {
    matches!(cpu.sp(), 0 | STACK_TOP)
}

fn execute(
    cpu: &mut Cpu,
    mem: &mut Ram,
    out: &mut impl Write,
    pc: u8,
    instr: Instruction,
) -> Result<Flow, VmError> {
    let mut next_pc = None;
    match instr {
        Instruction::Hlt => return Ok(Flow::Halt),
        Instruction::Ldi { reg, value } => cpu.write(reg, value)?,
        Instruction::Prn { reg } => writeln!(out, "{}", cpu.read(reg)?)?,
        Instruction::Add { a, b } => alu(cpu, AluOp::Add, a, b)?,
        Instruction::Mul { a, b } => alu(cpu, AluOp::Mul, a, b)?,
        Instruction::Cmp { a, b } => {
            let ord = cpu.read(a)?.cmp(&cpu.read(b)?);
            cpu.set_compare(ord);
        }

        Instruction::Push { reg } => {
            let v = cpu.read(reg)?;
            push(cpu, mem, pc, v)?;
        }
        Instruction::Pop { reg } => {
            cpu.read(reg)?;
            if stack_empty(cpu) {
                return Ok(Flow::Skip(Fault::StackUnderflow { pc }));
            }
            let v = pop(cpu, mem)?;
            cpu.write(reg, v)?;
        }

        // Control flow: the target replaces the sequential advance.
        Instruction::Call { reg } => {
            let target = cpu.read(reg)?;
            let ret = pc as usize + instr.size();
            let ret = u8::try_from(ret).map_err(|_| VmError::AddressOutOfBounds { address: ret })?;
            push(cpu, mem, pc, ret)?;
            next_pc = Some(target);
        }
        // No empty check: RET trusts whatever sits at SP.
        Instruction::Ret => next_pc = Some(pop(cpu, mem)?),
        Instruction::Jmp { reg } => next_pc = Some(cpu.read(reg)?),
        Instruction::Jeq { reg } => {
            let target = cpu.read(reg)?;
            if cpu.equal() {
                next_pc = Some(target);
            }
        }
        Instruction::Jne { reg } => {
            let target = cpu.read(reg)?;
            if !cpu.equal() {
                next_pc = Some(target);
            }
        }
    }
    Ok(Flow::Continue { next_pc })
}

fn advance(pc: u8, size: usize) -> Result<u8, VmError> {
    let next = pc as usize + size;
    u8::try_from(next).map_err(|_| VmError::AddressOutOfBounds { address: next })
}

/// Executes the instruction at PC.
pub fn step(cpu: &mut Cpu, mem: &mut Ram, out: &mut impl Write) -> Result<StepOutcome, VmError> {
    let pc = cpu.pc;
    let instr = decoder::fetch(mem, pc)?;
    tracing::trace!(pc, %instr, "exec");

    // An instruction that can only fall through must have somewhere to fall
    // to before it touches any state.
    let fallthrough = match advance(pc, instr.size()) {
        Ok(next) => Some(next),
        Err(e) if !instr.is_branch() && instr != Instruction::Hlt => return Err(e),
        Err(_) => None,
    };

    match execute(cpu, mem, out, pc, instr)? {
        Flow::Halt => {
            // HLT at 255 has no next address; PC stays on it.
            cpu.pc = fallthrough.unwrap_or(pc);
            Ok(StepOutcome::Halted)
        }
        Flow::Continue { next_pc } => {
            cpu.pc = match next_pc.or(fallthrough) {
                Some(target) => target,
                None => advance(pc, instr.size())?,
            };
            Ok(StepOutcome::Running)
        }
        Flow::Skip(fault) => {
            tracing::warn!(%fault, "recoverable fault");
            cpu.pc = match fallthrough {
                Some(next) => next,
                None => advance(pc, instr.size())?,
            };
            Ok(StepOutcome::Faulted(fault))
        }
    }
}

/// Runs until HLT, a fatal error, or the configured step limit.
pub fn run(
    cpu: &mut Cpu,
    mem: &mut Ram,
    out: &mut impl Write,
    config: &RunConfig,
) -> Result<RunReport, VmError> {
    let mut steps = 0u64;
    let mut faults = Vec::new();
    loop {
        if config.max_steps.is_some_and(|max| steps >= max) {
            tracing::debug!(steps, "step limit reached");
            return Ok(RunReport { reason: HaltReason::StepLimit, steps, faults });
        }
        if config.trace {
            tracing::trace!(target: "ls8::trace", "{}", trace_line(cpu, mem));
        }
        let outcome = step(cpu, mem, out).inspect_err(|e| {
            tracing::debug!(steps, error = %e, "run aborted");
        })?;
        steps += 1;
        match outcome {
            StepOutcome::Running => {}
            StepOutcome::Faulted(fault) => faults.push(fault),
            StepOutcome::Halted => {
                tracing::debug!(steps, "halted");
                return Ok(RunReport { reason: HaltReason::Halted, steps, faults });
            }
        }
    }
}

/// `PC | three bytes at PC | R0..R7`, all hex.
pub fn trace_line(cpu: &Cpu, mem: &Ram) -> String {
    let pc = cpu.pc as usize;
    let peek = |i: usize| mem.read(pc + i).unwrap_or(0);
    let mut line = format!("{:02X} | {:02X} {:02X} {:02X} |", pc, peek(0), peek(1), peek(2));
    for r in cpu.reg {
        line.push_str(&format!(" {r:02X}"));
    }
    line
}
