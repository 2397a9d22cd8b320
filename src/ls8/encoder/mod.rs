// src/ls8/encoder/mod.rs
use crate::ls8::arch::*;
use crate::ls8::instruction::Instruction;

/// Opcode byte for `inst`. Its two high bits carry the operand count.
pub fn opcode(inst: Instruction) -> u8 {
    use Instruction::*;
    match inst {
        Hlt => OPC_HLT,
        Ret => OPC_RET,
        Push { .. } => OPC_PUSH,
        Pop { .. } => OPC_POP,
        Prn { .. } => OPC_PRN,
        Call { .. } => OPC_CALL,
        Jmp { .. } => OPC_JMP,
        Jeq { .. } => OPC_JEQ,
        Jne { .. } => OPC_JNE,
        Ldi { .. } => OPC_LDI,
        Add { .. } => OPC_ADD,
        Mul { .. } => OPC_MUL,
        Cmp { .. } => OPC_CMP,
    }
}

/// Appends the encoded bytes of `inst` to `out`.
pub fn encode_into(inst: Instruction, out: &mut Vec<u8>) {
    use Instruction::*;
    out.push(opcode(inst));
    match inst {
        Hlt | Ret => {}
        Push { reg } | Pop { reg } | Prn { reg } | Call { reg } | Jmp { reg }
        | Jeq { reg } | Jne { reg } => out.push(reg),
        Ldi { reg, value } => out.extend_from_slice(&[reg, value]),
        Add { a, b } | Mul { a, b } | Cmp { a, b } => out.extend_from_slice(&[a, b]),
    }
}

pub fn encode(inst: Instruction) -> Vec<u8> {
    let mut out = Vec::with_capacity(3);
    encode_into(inst, &mut out);
    out
}

pub fn encode_all(program: &[Instruction]) -> Vec<u8> {
    let mut out = Vec::new();
    for &inst in program {
        encode_into(inst, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ls8::instruction::Instruction::*;

    #[test]
    fn operand_count_lives_in_high_bits() {
        let all = [
            Hlt,
            Ret,
            Push { reg: 1 },
            Pop { reg: 1 },
            Prn { reg: 1 },
            Call { reg: 1 },
            Jmp { reg: 1 },
            Jeq { reg: 1 },
            Jne { reg: 1 },
            Ldi { reg: 1, value: 2 },
            Add { a: 1, b: 2 },
            Mul { a: 1, b: 2 },
            Cmp { a: 1, b: 2 },
        ];
        for inst in all {
            let bytes = encode(inst);
            assert_eq!(bytes.len(), 1 + (bytes[0] >> 6) as usize, "{inst}");
            assert_eq!(bytes.len(), inst.size());
        }
    }

    #[test]
    fn ldi_bytes() {
        assert_eq!(encode(Ldi { reg: 0, value: 8 }), vec![0b1000_0010, 0, 8]);
    }
}
