use crate::ls8::arch::*;
use crate::ls8::errors::VmError;
use crate::ls8::instruction::Instruction;
use crate::ls8::memory::Ram;

/// Number of operand bytes following `opcode`.
#[inline]
pub fn operand_count(opcode: u8) -> usize {
    (opcode >> 6) as usize
}

/// Builds an instruction from an opcode and its operand bytes. `ops` must hold
/// at least `operand_count(opcode)` bytes. Returns `None` for unknown opcodes.
pub fn decode(opcode: u8, ops: &[u8]) -> Option<Instruction> {
    let op = |i: usize| ops.get(i).copied();
    Some(match opcode {
        OPC_HLT => Instruction::Hlt,
        OPC_RET => Instruction::Ret,
        OPC_PUSH => Instruction::Push { reg: op(0)? },
        OPC_POP => Instruction::Pop { reg: op(0)? },
        OPC_PRN => Instruction::Prn { reg: op(0)? },
        OPC_CALL => Instruction::Call { reg: op(0)? },
        OPC_JMP => Instruction::Jmp { reg: op(0)? },
        OPC_JEQ => Instruction::Jeq { reg: op(0)? },
        OPC_JNE => Instruction::Jne { reg: op(0)? },
        OPC_LDI => Instruction::Ldi { reg: op(0)?, value: op(1)? },
        OPC_ADD => Instruction::Add { a: op(0)?, b: op(1)? },
        OPC_MUL => Instruction::Mul { a: op(0)?, b: op(1)? },
        OPC_CMP => Instruction::Cmp { a: op(0)?, b: op(1)? },
        _ => return None,
    })
}

/// Fetches and decodes the instruction starting at `pc`.
pub fn fetch(mem: &Ram, pc: u8) -> Result<Instruction, VmError> {
    let at = pc as usize;
    let opcode = mem.read(at)?;
    // unknown opcodes are reported before any operand fetch
    if decode(opcode, &[0; 2]).is_none() {
        return Err(VmError::UnknownInstruction { pc, opcode });
    }
    let mut ops = [0u8; 2];
    for (i, slot) in ops.iter_mut().take(operand_count(opcode)).enumerate() {
        *slot = mem.read(at + 1 + i)?;
    }
    decode(opcode, &ops).ok_or(VmError::UnknownInstruction { pc, opcode })
}

/// Linear disassembly of `bytes`, starting at address 0. Bytes that do not
/// start a known instruction, or whose operands run past the end, are listed
/// as `DB`.
pub fn disasm(bytes: &[u8]) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut addr = 0;
    while addr < bytes.len() {
        let opcode = bytes[addr];
        let n = operand_count(opcode);
        let ops = bytes.get(addr + 1..addr + 1 + n);
        match ops.and_then(|ops| decode(opcode, ops)) {
            Some(inst) => {
                out.push((addr, inst.to_string()));
                addr += 1 + n;
            }
            None => {
                out.push((addr, format!("DB 0x{opcode:02X}")));
                addr += 1;
            }
        }
    }
    out
}
