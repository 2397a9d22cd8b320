// ls8/instruction.rs
use std::fmt;

/// A decoded LS-8 instruction. Register fields hold the raw operand byte; they
/// are validated when the instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // no operands
    Hlt,
    Ret,

    // one register
    Push { reg: u8 },
    Pop { reg: u8 },
    Prn { reg: u8 },
    Call { reg: u8 },
    Jmp { reg: u8 },
    Jeq { reg: u8 },
    Jne { reg: u8 },

    // register + immediate
    Ldi { reg: u8, value: u8 },

    // ALU
    Add { a: u8, b: u8 },
    Mul { a: u8, b: u8 },
    Cmp { a: u8, b: u8 },
}

impl Instruction {
    pub fn mnemonic(&self) -> &'static str {
        use Instruction::*;
        match self {
            Hlt => "HLT",
            Ret => "RET",
            Push { .. } => "PUSH",
            Pop { .. } => "POP",
            Prn { .. } => "PRN",
            Call { .. } => "CALL",
            Jmp { .. } => "JMP",
            Jeq { .. } => "JEQ",
            Jne { .. } => "JNE",
            Ldi { .. } => "LDI",
            Add { .. } => "ADD",
            Mul { .. } => "MUL",
            Cmp { .. } => "CMP",
        }
    }

    /// Whether executing this may replace the sequential PC advance.
    pub fn is_branch(&self) -> bool {
        use Instruction::*;
        matches!(self, Call { .. } | Ret | Jmp { .. } | Jeq { .. } | Jne { .. })
    }

    /// Encoded size in bytes, opcode included.
    pub fn size(&self) -> usize {
        1 + (crate::ls8::encoder::opcode(*self) >> 6) as usize
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        let m = self.mnemonic();
        match *self {
            Hlt | Ret => write!(f, "{m}"),
            Push { reg } | Pop { reg } | Prn { reg } | Call { reg } | Jmp { reg }
            | Jeq { reg } | Jne { reg } => write!(f, "{m} R{reg}"),
            Ldi { reg, value } => write!(f, "{m} R{reg},{value}"),
            Add { a, b } | Mul { a, b } | Cmp { a, b } => write!(f, "{m} R{a},R{b}"),
        }
    }
}
