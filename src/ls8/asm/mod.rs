// src/ls8/asm/mod.rs
mod errors;
#[cfg(test)]
mod tests;

pub use errors::AsmError;

use crate::ls8::arch::*;
use crate::ls8::decoder::{decode, operand_count};
use crate::ls8::encoder::encode_into;
use std::collections::HashMap;

const MNEMONICS: [(&str, u8); 13] = [
    ("HLT", OPC_HLT),
    ("RET", OPC_RET),
    ("PUSH", OPC_PUSH),
    ("POP", OPC_POP),
    ("PRN", OPC_PRN),
    ("CALL", OPC_CALL),
    ("JMP", OPC_JMP),
    ("JEQ", OPC_JEQ),
    ("JNE", OPC_JNE),
    ("LDI", OPC_LDI),
    ("ADD", OPC_ADD),
    ("MUL", OPC_MUL),
    ("CMP", OPC_CMP),
];

fn lookup(mnemonic: &str) -> Option<u8> {
    MNEMONICS
        .iter()
        .find(|(m, _)| m.eq_ignore_ascii_case(mnemonic))
        .map(|&(_, opc)| opc)
}

enum Stmt {
    Op(u8),
    Db,
}

struct Item<'a> {
    line: usize,
    stmt: Stmt,
    args: Vec<&'a str>,
}

// ---------- API ----------
/// Assembles LS-8 source into a memory image starting at address 0.
///
/// One statement per line: an optional `label:`, a mnemonic and its
/// comma-separated operands. Registers are written `R0`..`R7`; immediates are
/// decimal, `0x` hex, `0b` binary or a label name. `DB value` emits one raw
/// byte. `;` and `#` start a comment.
pub fn assemble(text: &str) -> Result<Vec<u8>, AsmError> {
    // 1st pass: symbol table
    let mut labels = HashMap::<&str, usize>::new();
    let mut items = Vec::new();
    let mut addr = 0usize;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let mut line = strip_comment(raw).trim();

        if let Some((lab, rest)) = line.split_once(':') {
            let lab = lab.trim();
            if !is_ident(lab) {
                return Err(AsmError::new(line_no, format!("invalid label '{lab}'")));
            }
            if labels.insert(lab, addr).is_some() {
                return Err(AsmError::new(line_no, format!("duplicate label '{lab}'")));
            }
            line = rest.trim();
        }
        if line.is_empty() {
            continue;
        }

        let (mnemonic, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        let args: Vec<&str> = if rest.trim().is_empty() {
            Vec::new()
        } else {
            rest.split(',').map(str::trim).collect()
        };

        let (stmt, expected) = if mnemonic.eq_ignore_ascii_case("DB") {
            (Stmt::Db, 1)
        } else {
            let opc = lookup(mnemonic)
                .ok_or_else(|| AsmError::new(line_no, format!("unknown mnemonic '{mnemonic}'")))?;
            (Stmt::Op(opc), operand_count(opc))
        };
        if args.len() != expected {
            return Err(AsmError::new(
                line_no,
                format!("{mnemonic} expects {expected} operand(s), got {}", args.len()),
            ));
        }

        addr += 1 + if matches!(stmt, Stmt::Op(_)) { expected } else { 0 };
        if addr > MEMORY_SIZE {
            return Err(AsmError::new(line_no, "program does not fit in memory"));
        }
        items.push(Item { line: line_no, stmt, args });
    }

    // 2nd pass: encoding
    let mut out = Vec::with_capacity(addr);
    for item in &items {
        match item.stmt {
            Stmt::Db => out.push(parse_value(item.args[0], &labels, item.line)?),
            Stmt::Op(opc) => {
                let mut ops = Vec::with_capacity(item.args.len());
                for (slot, arg) in item.args.iter().enumerate() {
                    // LDI's second operand is the only immediate slot.
                    let byte = if opc == OPC_LDI && slot == 1 {
                        parse_value(arg, &labels, item.line)?
                    } else {
                        parse_reg(arg, item.line)?
                    };
                    ops.push(byte);
                }
                let inst = decode(opc, &ops)
                    .ok_or_else(|| AsmError::new(item.line, "cannot encode instruction"))?;
                encode_into(inst, &mut out);
            }
        }
    }
    tracing::debug!(bytes = out.len(), labels = labels.len(), "assembled");
    Ok(out)
}

// ---------- helpers ----------
fn strip_comment(line: &str) -> &str {
    match line.find([';', '#']) {
        Some(i) => &line[..i],
        None => line,
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_reg(s: &str, line: usize) -> Result<u8, AsmError> {
    s.strip_prefix(['R', 'r'])
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|&n| (n as usize) < REGISTERS_LEN)
        .ok_or_else(|| AsmError::new(line, format!("invalid register '{s}'")))
}

fn parse_value(s: &str, labels: &HashMap<&str, usize>, line: usize) -> Result<u8, AsmError> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u32::from_str_radix(bin, 2).ok()
    } else if s.starts_with(|c: char| c.is_ascii_digit()) {
        s.parse::<u32>().ok()
    } else if is_ident(s) {
        let addr = labels
            .get(s)
            .ok_or_else(|| AsmError::new(line, format!("undefined label '{s}'")))?;
        Some(*addr as u32)
    } else {
        None
    };
    let v = parsed.ok_or_else(|| AsmError::new(line, format!("invalid value '{s}'")))?;
    u8::try_from(v).map_err(|_| AsmError::new(line, format!("value out of 0..255: {v}")))
}
