//! # Instruction Encoding Helpers
//!
//! Cell-level encoding shared by the runtime fetch, the disassembler and
//! external assemblers.
//!
//! ## Instruction Format
//!
//! ```text
//! [opcode][operand 0][operand 1]...
//! ```
//!
//! Each field is one memory cell of the chip's word width. Register, bit and
//! address operands are unsigned cell values. Relative offsets are two's
//! complement: a full cell for `RJMP`, a 7-bit field for the conditional
//! branches.

use crate::arch::Architecture;
use crate::error::McuError;
use crate::instruction::InstructionDescriptor;
use crate::integer::Width;
use crate::opcode::Operation;
use crate::operand::OperandKind;

// ============================================================================
// Constants
// ============================================================================

/// Width of the offset field of `BRBS` / `BRBC`
pub const BRANCH_OFFSET_BITS: u32 = 7;

/// Mask for the branch offset field
pub const BRANCH_OFFSET_MASK: u32 = (1 << BRANCH_OFFSET_BITS) - 1;

// ============================================================================
// Field Helpers
// ============================================================================

/// Sign-extend the low `bits` bits of `value`
#[inline]
pub const fn sign_extend(value: u32, bits: u32) -> i64 {
    let shift = 64 - bits;
    (((value as u64) << shift) as i64) >> shift
}

/// Bits available to an offset operand of `desc`
#[inline]
pub fn offset_bits(desc: &InstructionDescriptor, width: Width) -> u32 {
    match desc.operation {
        Operation::BranchIfSet | Operation::BranchIfClear => BRANCH_OFFSET_BITS,
        _ => width.bits(),
    }
}

/// Signed offset held in an offset operand cell
#[inline]
pub fn decode_offset(desc: &InstructionDescriptor, width: Width, cell: u32) -> i64 {
    let bits = offset_bits(desc, width);
    sign_extend(cell & mask(bits), bits)
}

#[inline]
const fn mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode one instruction into cells of `width`.
///
/// A missing trailing immediate is filled from the descriptor's default, so
/// `ADIW Z` encodes as `ADIW Z, 1`. Offsets outside their field are
/// rejected; other operands wrap to the cell width.
pub fn encode(
    arch: &Architecture,
    width: Width,
    mnemonic: &str,
    operands: &[i64],
) -> Result<Vec<u32>, McuError> {
    let desc = arch.lookup(mnemonic)?;
    let expected = desc.operands.len();

    let defaulted;
    let operands = match (operands.len(), desc.default_immediate) {
        (n, _) if n == expected => operands,
        (n, Some(default))
            if n + 1 == expected && desc.operands.last() == Some(&OperandKind::Immediate) =>
        {
            defaulted = operands
                .iter()
                .copied()
                .chain(std::iter::once(default))
                .collect::<Vec<_>>();
            &defaulted[..]
        }
        (found, _) => {
            return Err(McuError::OperandCount {
                mnemonic: desc.mnemonic,
                expected,
                found,
            })
        }
    };

    let mut cells = Vec::with_capacity(desc.width() as usize);
    cells.push(desc.opcode as u32);

    for (&kind, &value) in desc.operands.iter().zip(operands) {
        let cell = match kind {
            OperandKind::Offset => {
                let bits = offset_bits(desc, width);
                let min = -(1i64 << (bits - 1));
                let max = (1i64 << (bits - 1)) - 1;
                if value < min || value > max {
                    return Err(McuError::OperandRange {
                        mnemonic: desc.mnemonic,
                        value,
                        bits,
                    });
                }
                (value as u64 & mask(bits) as u64) as u32
            }
            _ => width.wrap(value),
        };
        cells.push(cell);
    }

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::m1047;

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0x7F, 7), -1);
        assert_eq!(sign_extend(0x40, 7), -64);
        assert_eq!(sign_extend(0x3F, 7), 63);
        assert_eq!(sign_extend(0xFE, 8), -2);
        assert_eq!(sign_extend(0xFFFF_FFFF, 32), -1);
    }

    #[test]
    fn test_encode_add() {
        let arch = Architecture::m1047();
        let cells = encode(&arch, Width::W8, "add", &[0, 1]).unwrap();
        assert_eq!(cells, vec![m1047::ADD as u32, 0, 1]);
    }

    #[test]
    fn test_encode_nop() {
        let arch = Architecture::m1047();
        assert_eq!(encode(&arch, Width::W8, "NOP", &[]).unwrap(), vec![0]);
    }

    #[test]
    fn test_encode_default_immediate() {
        let arch = Architecture::m1047();
        let cells = encode(&arch, Width::W8, "ADIW", &[2]).unwrap();
        assert_eq!(cells, vec![m1047::ADIW as u32, 2, 1]);
    }

    #[test]
    fn test_encode_operand_count() {
        let arch = Architecture::m1047();
        let err = encode(&arch, Width::W8, "ADD", &[0]).unwrap_err();
        assert_eq!(
            err,
            McuError::OperandCount {
                mnemonic: "ADD",
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_encode_wraps_immediates() {
        let arch = Architecture::m1047();
        let cells = encode(&arch, Width::W8, "LDI", &[0, -1]).unwrap();
        assert_eq!(cells[2], 0xFF);
    }

    #[test]
    fn test_branch_offset_field() {
        let arch = Architecture::m1047();
        let cells = encode(&arch, Width::W8, "BRBC", &[1, -3]).unwrap();
        assert_eq!(cells, vec![m1047::BRBC as u32, 1, 0x7D]);

        let desc = arch.decode(m1047::BRBC).unwrap();
        assert_eq!(decode_offset(desc, Width::W8, cells[2]), -3);

        assert!(encode(&arch, Width::W8, "BRBS", &[0, 63]).is_ok());
        assert!(matches!(
            encode(&arch, Width::W8, "BRBS", &[0, 64]),
            Err(McuError::OperandRange { bits: 7, .. })
        ));
        assert!(encode(&arch, Width::W8, "BRBS", &[0, -64]).is_ok());
    }

    #[test]
    fn test_relative_jump_uses_full_cell() {
        let arch = Architecture::m1047();
        let cells = encode(&arch, Width::W8, "RJMP", &[-128]).unwrap();
        assert_eq!(cells[1], 0x80);
        let desc = arch.decode(m1047::RJMP).unwrap();
        assert_eq!(decode_offset(desc, Width::W8, cells[1]), -128);
        assert!(encode(&arch, Width::W8, "RJMP", &[128]).is_err());
        assert!(encode(&arch, Width::W16, "RJMP", &[128]).is_ok());
    }

    #[test]
    fn test_unknown_mnemonic() {
        let arch = Architecture::m1047();
        assert_eq!(
            encode(&arch, Width::W8, "HCF", &[]).unwrap_err(),
            McuError::UnknownMnemonic("HCF".to_string())
        );
    }
}
