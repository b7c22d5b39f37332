//! Main disassembler logic

use crate::decoder::decode;
use crate::error::DisassemblerError;
use crate::formatter::format;
use mcu_spec::{Architecture, Width};
use std::fmt::Write;

/// Disassemble a block of program cells into an assembly listing.
///
/// Undecodable opcode cells are reported inline and skipped one cell at a
/// time; a truncated instruction ends the listing.
pub fn disassemble(arch: &Architecture, width: Width, cells: &[u32], origin: usize) -> String {
    let digits = (width.bits() / 4) as usize;
    let mut body = String::new();
    let mut count = 0usize;
    let mut offset = 0usize;

    while offset < cells.len() {
        let addr = origin + offset;
        let _ = write!(body, "0x{:04X}:  ", addr);

        match decode(arch, width, &cells[offset..]) {
            Ok(decoded) => {
                let raw = cells[offset..offset + decoded.size()]
                    .iter()
                    .map(|c| format!("{:0digits$X}", c, digits = digits))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = writeln!(body, "{:<24}{}", raw, format(&decoded));
                offset += decoded.size();
                count += 1;
            }
            Err(e @ DisassemblerError::Truncated { .. }) => {
                let _ = writeln!(body, "; ERROR: {}", e);
                break;
            }
            Err(e) => {
                let _ = writeln!(body, "; ERROR: {}", e);
                offset += 1;
            }
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "; {} disassembly", arch.name());
    let _ = writeln!(output, "; Origin: 0x{:04X}", origin);
    let _ = writeln!(
        output,
        "; Code size: {} cells ({} instructions)",
        cells.len(),
        count
    );
    output.push('\n');
    output.push_str(&body);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcu_spec::opcode::m1047;

    #[test]
    fn test_disassemble_simple() {
        let arch = Architecture::m1047();
        let code = vec![m1047::ADD as u32, 0, 1, m1047::BREAK as u32];
        let asm = disassemble(&arch, Width::W8, &code, 0);

        assert!(asm.contains("add r0, r1"));
        assert!(asm.contains("0x0003:"));
        assert!(asm.contains("break"));
        assert!(asm.contains("4 cells (2 instructions)"));
    }

    #[test]
    fn test_disassemble_skips_unknown() {
        let arch = Architecture::m1047();
        let code = vec![0xF0, m1047::NOP as u32];
        let asm = disassemble(&arch, Width::W8, &code, 0x10);

        assert!(asm.contains("0x0010:  ; ERROR: Unknown opcode: 0xF0"));
        assert!(asm.contains("0x0011:"));
        assert!(asm.contains("nop"));
    }
}
