//! Integration tests for the M1047 disassembler
//!
//! Tests the complete disassembly workflow including:
//! - Decoding every table entry
//! - Output formatting
//! - Error handling for invalid and truncated cells

use mcu_disassembler::{decode, disassemble, format, DisassemblerError};
use mcu_spec::opcode::m1047;
use mcu_spec::{encode, Architecture, Width};

// ============================================================================
// Decode Tests
// ============================================================================

#[test]
fn test_decode_every_table_entry() {
    let arch = Architecture::m1047();
    for desc in arch.table().iter() {
        let mut cells = vec![desc.opcode as u32];
        cells.extend(std::iter::repeat(1).take(desc.operands.len()));

        let decoded = decode(&arch, Width::W8, &cells).unwrap();
        assert_eq!(decoded.descriptor, desc);
        assert_eq!(decoded.size(), cells.len());
        assert!(format(&decoded).starts_with(&desc.mnemonic.to_ascii_lowercase()));
    }
}

#[test]
fn test_decode_ignores_trailing_cells() {
    let arch = Architecture::m1047();
    let decoded = decode(&arch, Width::W8, &[m1047::RET as u32, 9, 9, 9]).unwrap();
    assert_eq!(decoded.size(), 1);
    assert!(decoded.operands.is_empty());
}

#[test]
fn test_decode_sixteen_bit_cells() {
    let arch = Architecture::m1047();
    let cells = encode(&arch, Width::W16, "LDI", &[0, 0x1234]).unwrap();
    let decoded = decode(&arch, Width::W16, &cells).unwrap();
    assert_eq!(format(&decoded), "ldi r0, 4660");
}

// ============================================================================
// Listing Tests
// ============================================================================

#[test]
fn test_listing_of_encoded_program() {
    let arch = Architecture::m1047();
    let program: Vec<u32> = [
        encode(&arch, Width::W8, "LDI", &[0, 200]).unwrap(),
        encode(&arch, Width::W8, "LDI", &[1, 100]).unwrap(),
        encode(&arch, Width::W8, "ADD", &[0, 1]).unwrap(),
        encode(&arch, Width::W8, "BRBC", &[1, -9]).unwrap(),
        encode(&arch, Width::W8, "BREAK", &[]).unwrap(),
    ]
    .concat();

    let asm = disassemble(&arch, Width::W8, &program, 0);
    let lines: Vec<&str> = asm.lines().filter(|l| l.starts_with("0x")).collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].ends_with("ldi r0, 200"));
    assert!(lines[2].starts_with("0x0006:"));
    assert!(lines[3].ends_with("brbc 1, -9"));
    assert!(lines[4].ends_with("break"));
    assert!(asm.contains("(5 instructions)"));
}

#[test]
fn test_listing_stops_at_truncation() {
    let arch = Architecture::m1047();
    let asm = disassemble(&arch, Width::W8, &[m1047::NOP as u32, m1047::JMP as u32], 0);
    assert!(asm.contains("nop"));
    assert!(asm.contains("Truncated instruction: JMP"));
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_error_variants() {
    let arch = Architecture::m1047();
    assert!(matches!(
        decode(&arch, Width::W8, &[0xEE]),
        Err(DisassemblerError::UnknownOpcode(0xEE))
    ));
    assert!(matches!(
        decode(&arch, Width::W32, &[0x1_0000]),
        Err(DisassemblerError::InvalidCell(0x1_0000))
    ));
}
