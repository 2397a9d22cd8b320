use crate::ls8::{errors::VmError, registers::Cpu};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Mul,
}

/// Applies `op` to registers `a` and `b`, writing the result back into `a`.
pub fn alu(cpu: &mut Cpu, op: AluOp, a: u8, b: u8) -> Result<(), VmError> {
    let x = cpu.read(a)?;
    let y = cpu.read(b)?;
    let res = match op {
        AluOp::Add => x.wrapping_add(y),
        AluOp::Mul => x.wrapping_mul(y),
    };
    cpu.write(a, res)
}
