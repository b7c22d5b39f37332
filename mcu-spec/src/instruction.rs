//! Instruction descriptors and the instruction table
//!
//! Every instruction is one opcode cell followed by one cell per operand, so
//! its encoded width is `1 + operands.len()` cells.

use crate::error::McuError;
use crate::flags::Flag;
use crate::integer::Width;
use crate::opcode::Operation;
use crate::operand::OperandKind;
use std::collections::HashMap;
use std::fmt;

/// One row of an instruction table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstructionDescriptor {
    pub mnemonic: &'static str,
    pub opcode: u8,
    pub operation: Operation,
    pub operands: &'static [OperandKind],
    /// Value an assembler may use when the trailing immediate is omitted
    pub default_immediate: Option<i64>,
    /// Flags the instruction may modify; all others are left alone
    pub flags: &'static [Flag],
    pub description: &'static str,
}

impl InstructionDescriptor {
    pub const fn new(
        mnemonic: &'static str,
        opcode: u8,
        operation: Operation,
        operands: &'static [OperandKind],
        flags: &'static [Flag],
        description: &'static str,
    ) -> Self {
        Self {
            mnemonic,
            opcode,
            operation,
            operands,
            default_immediate: None,
            flags,
            description,
        }
    }

    pub const fn with_default(mut self, immediate: i64) -> Self {
        self.default_immediate = Some(immediate);
        self
    }

    /// Encoded width in cells
    #[inline]
    pub fn width(&self) -> u32 {
        1 + self.operands.len() as u32
    }

    /// Encoded width in bits for a given cell width
    #[inline]
    pub fn encoded_bits(&self, cell: Width) -> u32 {
        self.width() * cell.bits()
    }

    /// Whether the instruction may write `flag`
    #[inline]
    pub fn modifies(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    /// Position of the first operand of `kind`
    pub fn operand_position(&self, kind: OperandKind) -> Option<usize> {
        self.operands.iter().position(|&k| k == kind)
    }

    /// Operand signature, e.g. `Rd, Rr`
    pub fn signature(&self) -> String {
        self.operands
            .iter()
            .map(|k| k.symbol())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for InstructionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            write!(f, "{:#04x} {}", self.opcode, self.mnemonic)
        } else {
            write!(f, "{:#04x} {} {}", self.opcode, self.mnemonic, self.signature())
        }
    }
}

/// Instruction table indexed by opcode and by mnemonic
#[derive(Clone, Debug)]
pub struct InstructionTable {
    entries: Vec<InstructionDescriptor>,
    by_opcode: HashMap<u8, usize>,
    by_mnemonic: HashMap<String, usize>,
}

impl InstructionTable {
    /// Build a table, rejecting duplicate opcodes or mnemonics
    pub fn new(entries: Vec<InstructionDescriptor>) -> Result<Self, McuError> {
        let mut by_opcode = HashMap::with_capacity(entries.len());
        let mut by_mnemonic = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            if let Some(&prev) = by_opcode.get(&entry.opcode) {
                let prev: &InstructionDescriptor = &entries[prev];
                return Err(McuError::DuplicateOpcode {
                    opcode: entry.opcode,
                    first: prev.mnemonic,
                    second: entry.mnemonic,
                });
            }
            let key = entry.mnemonic.to_ascii_uppercase();
            if by_mnemonic.contains_key(&key) {
                return Err(McuError::DuplicateMnemonic(entry.mnemonic));
            }
            by_opcode.insert(entry.opcode, i);
            by_mnemonic.insert(key, i);
        }

        Ok(Self {
            entries,
            by_opcode,
            by_mnemonic,
        })
    }

    /// Descriptor for a mnemonic (case-insensitive)
    pub fn lookup(&self, mnemonic: &str) -> Result<&InstructionDescriptor, McuError> {
        self.by_mnemonic
            .get(&mnemonic.to_ascii_uppercase())
            .map(|&i| &self.entries[i])
            .ok_or_else(|| McuError::UnknownMnemonic(mnemonic.to_string()))
    }

    /// Descriptor for an opcode, if the table has one
    #[inline]
    pub fn decode(&self, opcode: u8) -> Option<&InstructionDescriptor> {
        self.by_opcode.get(&opcode).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &InstructionDescriptor> {
        self.entries.iter()
    }
}
