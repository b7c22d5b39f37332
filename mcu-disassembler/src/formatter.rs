//! Instruction formatting to assembly text

use crate::decoder::Decoded;
use mcu_spec::encoding::decode_offset;
use mcu_spec::{OperandKind, Pointer};

/// Format instruction as assembly text
pub fn format(decoded: &Decoded<'_>) -> String {
    let mnemonic = decoded.mnemonic().to_ascii_lowercase();
    if decoded.operands.is_empty() {
        return mnemonic;
    }

    let operands = decoded
        .descriptor
        .operands
        .iter()
        .zip(&decoded.operands)
        .map(|(&kind, &cell)| format_operand(decoded, kind, cell))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{} {}", mnemonic, operands)
}

fn format_operand(decoded: &Decoded<'_>, kind: OperandKind, cell: u32) -> String {
    match kind {
        OperandKind::Destination | OperandKind::Source | OperandKind::Result => {
            format_reg(cell)
        }
        OperandKind::Pointer => match Pointer::from_index(cell) {
            Some(pointer) => pointer.to_string(),
            None => format!("?{}", cell),
        },
        OperandKind::Offset => {
            let offset = decode_offset(decoded.descriptor, decoded.width, cell);
            format!("{:+}", offset)
        }
        OperandKind::Address | OperandKind::IoAddress => format!("0x{:02x}", cell),
        OperandKind::Immediate | OperandKind::Bit | OperandKind::FlagBit => cell.to_string(),
    }
}

/// Format register name
fn format_reg(index: u32) -> String {
    format!("r{}", index)
}
