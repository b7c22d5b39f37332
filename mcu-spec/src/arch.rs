//! # Architecture definitions
//!
//! An [`Architecture`] bundles a family's flag layout and instruction table.
//! It is immutable once built and shared between every chip of the family.

use crate::error::McuError;
use crate::flags::{Flag, FlagSet};
use crate::instruction::{InstructionDescriptor, InstructionTable};
use crate::opcode::{m1047 as op, Operation};
use crate::operand::OperandKind::{
    self, Address, Bit, Destination, FlagBit, Immediate, IoAddress, Offset, Pointer, Source,
};
use std::sync::{Arc, OnceLock};

#[derive(Clone, Debug)]
pub struct Architecture {
    name: &'static str,
    flags: FlagSet,
    table: InstructionTable,
}

impl Architecture {
    pub fn new(
        name: &'static str,
        flags: FlagSet,
        instructions: Vec<InstructionDescriptor>,
    ) -> Result<Self, McuError> {
        Ok(Self {
            name,
            flags,
            table: InstructionTable::new(instructions)?,
        })
    }

    /// The shared M1047 family definition
    pub fn m1047() -> Arc<Architecture> {
        static M1047: OnceLock<Arc<Architecture>> = OnceLock::new();
        M1047
            .get_or_init(|| {
                Arc::new(
                    Architecture::new("m1047", FlagSet::M1047, m1047_instructions())
                        .expect("M1047 instruction table has unique opcodes"),
                )
            })
            .clone()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn table(&self) -> &InstructionTable {
        &self.table
    }

    /// Width of the status register in bits
    pub fn status_bits(&self) -> usize {
        self.flags.status_bits()
    }

    pub fn lookup(&self, mnemonic: &str) -> Result<&InstructionDescriptor, McuError> {
        self.table.lookup(mnemonic)
    }

    pub fn decode(&self, opcode: u8) -> Option<&InstructionDescriptor> {
        self.table.decode(opcode)
    }
}

const ARITH: &[Flag] = &[
    Flag::Zero,
    Flag::Carry,
    Flag::Overflow,
    Flag::Sign,
    Flag::HalfCarry,
];
const WORD: &[Flag] = &[Flag::Zero, Flag::Carry, Flag::Overflow, Flag::Sign];
const LOGIC: &[Flag] = &[Flag::Zero, Flag::Overflow, Flag::Sign, Flag::Parity];
const COMPLEMENT: &[Flag] = &[
    Flag::Zero,
    Flag::Carry,
    Flag::Overflow,
    Flag::Sign,
    Flag::Parity,
];
const STEP: &[Flag] = &[Flag::Zero, Flag::Overflow, Flag::Sign];
const SHIFT: &[Flag] = &[Flag::Zero, Flag::Carry, Flag::Overflow, Flag::Sign];
const ANY: &[Flag] = &Flag::ALL;
const TRANSFER: &[Flag] = &[Flag::Transfer];
const NONE: &[Flag] = &[];

const RD_RR: &[OperandKind] = &[Destination, Source];
const RD_K: &[OperandKind] = &[Destination, Immediate];
const P_K: &[OperandKind] = &[Pointer, Immediate];
const RD: &[OperandKind] = &[Destination];
const RR: &[OperandKind] = &[Source];
const S_K: &[OperandKind] = &[FlagBit, Offset];

fn m1047_instructions() -> Vec<InstructionDescriptor> {
    use InstructionDescriptor as I;
    use Operation::*;

    vec![
        I::new("NOP", op::NOP, Nop, &[], NONE, "No operation"),
        // Arithmetic
        I::new("ADD", op::ADD, Add, RD_RR, ARITH, "Add without carry: Rd = Rd + Rr"),
        I::new("ADC", op::ADC, AddWithCarry, RD_RR, ARITH, "Add with carry: Rd = Rd + Rr + C"),
        I::new("ADIW", op::ADIW, AddWord, P_K, WORD, "Add immediate to word: P = P + K")
            .with_default(1),
        I::new("SUB", op::SUB, Subtract, RD_RR, ARITH, "Subtract without carry: Rd = Rd - Rr"),
        I::new("SUBI", op::SUBI, Subtract, RD_K, ARITH, "Subtract immediate: Rd = Rd - K"),
        I::new(
            "SBC",
            op::SBC,
            SubtractWithCarry,
            RD_RR,
            ARITH,
            "Subtract with carry: Rd = Rd - Rr - C",
        ),
        I::new(
            "SBCI",
            op::SBCI,
            SubtractWithCarry,
            RD_K,
            ARITH,
            "Subtract immediate with carry: Rd = Rd - K - C",
        ),
        I::new("SBIW", op::SBIW, SubtractWord, P_K, WORD, "Subtract immediate from word: P = P - K")
            .with_default(1),
        // Logic
        I::new("AND", op::AND, And, RD_RR, LOGIC, "Logical and: Rd = Rd & Rr"),
        I::new("ANDI", op::ANDI, And, RD_K, LOGIC, "Logical and with immediate: Rd = Rd & K"),
        I::new("OR", op::OR, Or, RD_RR, LOGIC, "Logical or: Rd = Rd | Rr"),
        I::new("ORI", op::ORI, Or, RD_K, LOGIC, "Logical or with immediate: Rd = Rd | K"),
        I::new("EOR", op::EOR, Xor, RD_RR, LOGIC, "Exclusive or: Rd = Rd ^ Rr"),
        I::new("COM", op::COM, Complement, RD, COMPLEMENT, "One's complement: Rd = !Rd"),
        I::new("NEG", op::NEG, Negate, RD, ARITH, "Two's complement: Rd = 0 - Rd"),
        I::new("INC", op::INC, Increment, RD, STEP, "Increment: Rd = Rd + 1"),
        I::new("DEC", op::DEC, Decrement, RD, STEP, "Decrement: Rd = Rd - 1"),
        I::new("CP", op::CP, Compare, RD_RR, ARITH, "Compare: flags of Rd - Rr"),
        I::new("CPI", op::CPI, Compare, RD_K, ARITH, "Compare with immediate: flags of Rd - K"),
        // Shift
        I::new("LSL", op::LSL, ShiftLeft, RD, ARITH, "Logical shift left"),
        I::new("LSR", op::LSR, ShiftRight, RD, SHIFT, "Logical shift right"),
        I::new("ASR", op::ASR, ArithmeticShiftRight, RD, SHIFT, "Arithmetic shift right"),
        I::new("ROR", op::ROR, RotateRight, RD, SHIFT, "Rotate right through carry"),
        // Data transfer
        I::new("MOV", op::MOV, Move, RD_RR, NONE, "Copy register: Rd = Rr"),
        I::new("LDI", op::LDI, Move, RD_K, NONE, "Load immediate: Rd = K"),
        I::new("LD", op::LD, Load, &[Destination, Pointer], NONE, "Load indirect: Rd = RAM[P]"),
        I::new("ST", op::ST, Store, &[Pointer, Source], NONE, "Store indirect: RAM[P] = Rr"),
        I::new("LDS", op::LDS, Load, &[Destination, Address], NONE, "Load direct: Rd = RAM[k]"),
        I::new("STS", op::STS, Store, &[Address, Source], NONE, "Store direct: RAM[k] = Rr"),
        I::new("PUSH", op::PUSH, Push, RR, NONE, "Push register on stack"),
        I::new("POP", op::POP, Pop, RD, NONE, "Pop register from stack"),
        I::new("IN", op::IN, In, &[Destination, IoAddress], NONE, "Read I/O: Rd = IO[A]"),
        I::new("OUT", op::OUT, Out, &[IoAddress, Source], NONE, "Write I/O: IO[A] = Rr"),
        I::new("SBI", op::SBI, SetPin, &[Bit], NONE, "Set digital pin b"),
        I::new("CBI", op::CBI, ClearPin, &[Bit], NONE, "Clear digital pin b"),
        // Bit
        I::new("BSET", op::BSET, SetFlag, &[FlagBit], ANY, "Set status bit s"),
        I::new("BCLR", op::BCLR, ClearFlag, &[FlagBit], ANY, "Clear status bit s"),
        I::new("BST", op::BST, BitStore, &[Destination, Bit], TRANSFER, "Store bit: X = Rd(b)"),
        I::new("BLD", op::BLD, BitLoad, &[Destination, Bit], NONE, "Load bit: Rd(b) = X"),
        // Control flow
        I::new("BRBS", op::BRBS, BranchIfSet, S_K, NONE, "Branch if status bit s is set"),
        I::new("BRBC", op::BRBC, BranchIfClear, S_K, NONE, "Branch if status bit s is clear"),
        I::new("RJMP", op::RJMP, Jump, &[Offset], NONE, "Relative jump: IP = IP + k"),
        I::new("JMP", op::JMP, Jump, &[Address], NONE, "Jump: IP = k"),
        I::new("CALL", op::CALL, Call, &[Address], NONE, "Call subroutine at k"),
        I::new("RET", op::RET, Return, &[], NONE, "Return from subroutine"),
        I::new("BREAK", op::BREAK, Break, &[], NONE, "Stop the chip"),
    ]
}
