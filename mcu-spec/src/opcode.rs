//! # Operations and M1047 opcode values
//!
//! An [`Operation`] names the semantics an instruction maps to. The engine
//! dispatches on operations, never on opcode values, so a family can add or
//! renumber instructions purely in its table.
//!
//! Register-or-immediate forms share one operation: `SUB Rd, Rr` and
//! `SUBI Rd, K` are both [`Operation::Subtract`]; the operand kinds tell the
//! engine where the second value comes from.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// No state change
    Nop,

    // ========== Arithmetic ==========
    /// Rd = Rd + src
    Add,
    /// Rd = Rd + src + C
    AddWithCarry,
    /// P = P + K over a register pair
    AddWord,
    /// Rd = Rd - src
    Subtract,
    /// Rd = Rd - src - C
    SubtractWithCarry,
    /// P = P - K over a register pair
    SubtractWord,
    /// Rd = Rd + 1
    Increment,
    /// Rd = Rd - 1
    Decrement,
    /// Rd = 0 - Rd
    Negate,
    /// flags of Rd - src, Rd unchanged
    Compare,

    // ========== Logical ==========
    /// Rd = Rd & src
    And,
    /// Rd = Rd | src
    Or,
    /// Rd = Rd ^ src
    Xor,
    /// Rd = !Rd
    Complement,

    // ========== Shift ==========
    /// Rd = Rd << 1, high bit into C
    ShiftLeft,
    /// Rd = Rd >> 1 (logical), low bit into C
    ShiftRight,
    /// Rd = Rd >> 1 keeping the sign bit, low bit into C
    ArithmeticShiftRight,
    /// Rd = C:Rd >> 1, low bit into C
    RotateRight,

    // ========== Data transfer ==========
    /// Rd = src
    Move,
    /// Rd = RAM[address]
    Load,
    /// RAM[address] = Rr
    Store,
    /// SP -= 1; RAM[SP] = Rr
    Push,
    /// Rd = RAM[SP]; SP += 1
    Pop,
    /// Rd = IO[A]
    In,
    /// IO[A] = Rr
    Out,
    /// digital pin b = 1
    SetPin,
    /// digital pin b = 0
    ClearPin,

    // ========== Bit ==========
    /// status bit s = 1
    SetFlag,
    /// status bit s = 0
    ClearFlag,
    /// Transfer = Rd(b)
    BitStore,
    /// Rd(b) = Transfer
    BitLoad,

    // ========== Control flow ==========
    /// if status bit s is set, IP += k
    BranchIfSet,
    /// if status bit s is clear, IP += k
    BranchIfClear,
    /// IP = k (absolute) or IP += k (offset)
    Jump,
    /// push return address; IP = k
    Call,
    /// IP = pop
    Return,
    /// stop the chip
    Break,
}

impl Operation {
    /// Whether the operation may redirect the instruction pointer
    pub const fn is_control_flow(self) -> bool {
        matches!(
            self,
            Operation::BranchIfSet
                | Operation::BranchIfClear
                | Operation::Jump
                | Operation::Call
                | Operation::Return
        )
    }

    /// Whether the operation touches the stack
    pub const fn uses_stack(self) -> bool {
        matches!(
            self,
            Operation::Push | Operation::Pop | Operation::Call | Operation::Return
        )
    }
}

/// M1047 opcode values
///
/// 0x00-0x0A keep the family's historical numbering.
pub mod m1047 {
    pub const NOP: u8 = 0x00;
    pub const ADD: u8 = 0x01;
    pub const ADC: u8 = 0x02;
    pub const ADIW: u8 = 0x03;
    pub const SUB: u8 = 0x04;
    pub const SUBI: u8 = 0x05;
    pub const SBC: u8 = 0x06;
    pub const SBCI: u8 = 0x07;
    pub const SBIW: u8 = 0x08;
    pub const AND: u8 = 0x09;
    pub const ANDI: u8 = 0x0A;
    pub const OR: u8 = 0x0B;
    pub const ORI: u8 = 0x0C;
    pub const EOR: u8 = 0x0D;
    pub const COM: u8 = 0x0E;
    pub const NEG: u8 = 0x0F;
    pub const INC: u8 = 0x10;
    pub const DEC: u8 = 0x11;
    pub const CP: u8 = 0x12;
    pub const CPI: u8 = 0x13;
    pub const LSL: u8 = 0x14;
    pub const LSR: u8 = 0x15;
    pub const ASR: u8 = 0x16;
    pub const ROR: u8 = 0x17;
    pub const MOV: u8 = 0x18;
    pub const LDI: u8 = 0x19;
    pub const LD: u8 = 0x1A;
    pub const ST: u8 = 0x1B;
    pub const LDS: u8 = 0x1C;
    pub const STS: u8 = 0x1D;
    pub const PUSH: u8 = 0x1E;
    pub const POP: u8 = 0x1F;
    pub const IN: u8 = 0x20;
    pub const OUT: u8 = 0x21;
    pub const SBI: u8 = 0x22;
    pub const CBI: u8 = 0x23;
    pub const BSET: u8 = 0x24;
    pub const BCLR: u8 = 0x25;
    pub const BST: u8 = 0x26;
    pub const BLD: u8 = 0x27;
    pub const BRBS: u8 = 0x28;
    pub const BRBC: u8 = 0x29;
    pub const RJMP: u8 = 0x2A;
    pub const JMP: u8 = 0x2B;
    pub const CALL: u8 = 0x2C;
    pub const RET: u8 = 0x2D;
    pub const BREAK: u8 = 0x2E;
}
