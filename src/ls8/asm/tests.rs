use super::*;
use crate::ls8::encoder::encode_all;
use crate::ls8::instruction::Instruction::*;

#[test]
fn mult_program_matches_hand_encoding() {
    let asm = "LDI R0,8\nLDI R1,9\nMUL R0,R1\nPRN R0\nHLT";
    let bytes = assemble(asm).expect("assemble");
    let expected = encode_all(&[
        Ldi { reg: 0, value: 8 },
        Ldi { reg: 1, value: 9 },
        Mul { a: 0, b: 1 },
        Prn { reg: 0 },
        Hlt,
    ]);
    assert_eq!(bytes, expected);
}

#[test]
fn labels_resolve_to_addresses() {
    let asm = "\
        LDI R1,Sub     ; 0
        CALL R1        ; 3
        HLT            ; 5
    Sub:
        PRN R0         ; 6
        RET            ; 8
    ";
    let bytes = assemble(asm).expect("assemble");
    assert_eq!(&bytes[..3], &[OPC_LDI, 1, 6]);
    assert_eq!(bytes.len(), 9);
    assert_eq!(bytes[8], OPC_RET);
}

#[test]
fn forward_and_inline_labels() {
    let bytes = assemble("LDI R2,end\nloop: JMP R2\nend: HLT").expect("assemble");
    assert_eq!(bytes, vec![OPC_LDI, 2, 5, OPC_JMP, 2, OPC_HLT]);
}

#[test]
fn number_formats_and_db() {
    let bytes = assemble("LDI r3,0x2A\nLDI R4,0b101\nDB 255\nDB 12 # data").expect("assemble");
    assert_eq!(bytes, vec![OPC_LDI, 3, 42, OPC_LDI, 4, 5, 255, 12]);
}

#[test]
fn mnemonics_are_case_insensitive() {
    let bytes = assemble("ldi R0,1\nprn R0\nhlt").expect("assemble");
    assert_eq!(bytes, vec![OPC_LDI, 0, 1, OPC_PRN, 0, OPC_HLT]);
}

#[test]
fn unknown_mnemonic_reports_line() {
    let err = assemble("LDI R0,1\nNOP").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.to_string(), "line 2: unknown mnemonic 'NOP'");
}

#[test]
fn bad_register_errors() {
    let err = assemble("PRN R8").unwrap_err();
    assert_eq!(err, AsmError::new(1, "invalid register 'R8'"));
    assert!(assemble("PRN 3").is_err());
}

#[test]
fn operand_count_checked() {
    let err = assemble("ADD R0").unwrap_err();
    assert!(err.msg.contains("expects 2"), "{err}");
    assert!(assemble("HLT R0").is_err());
}

#[test]
fn value_out_of_range() {
    let err = assemble("LDI R0,256").unwrap_err();
    assert!(err.msg.contains("out of 0..255"), "{err}");
}

#[test]
fn undefined_and_duplicate_labels() {
    assert!(assemble("LDI R0,nowhere").unwrap_err().msg.contains("undefined"));
    let err = assemble("a: HLT\na: HLT").unwrap_err();
    assert_eq!(err.line, 2);
}

#[test]
fn program_must_fit_in_memory() {
    let asm = "LDI R0,0\n".repeat(86);
    let err = assemble(&asm).unwrap_err();
    assert_eq!(err.line, 86);
    assert!(assemble(&"LDI R0,0\n".repeat(85)).is_ok());
}
