//! Status flags
//!
//! A [`FlagSet`] assigns each symbolic [`Flag`] a bit index in the status
//! register. Families may place the same flag at different positions; the
//! mapping is fixed once per architecture.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Flag {
    Zero,
    Carry,
    Overflow,
    Parity,
    Trap,
    HalfCarry,
    Sign,
    InterruptEnable,
    Transfer,
}

impl Flag {
    pub const COUNT: usize = 9;

    pub const ALL: [Flag; Flag::COUNT] = [
        Flag::Zero,
        Flag::Carry,
        Flag::Overflow,
        Flag::Parity,
        Flag::Trap,
        Flag::HalfCarry,
        Flag::Sign,
        Flag::InterruptEnable,
        Flag::Transfer,
    ];

    /// Dense index, usable for per-flag arrays
    #[inline]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// One-letter name used in listings
    pub const fn symbol(self) -> char {
        match self {
            Flag::Zero => 'Z',
            Flag::Carry => 'C',
            Flag::Overflow => 'O',
            Flag::Parity => 'P',
            Flag::Trap => 'T',
            Flag::HalfCarry => 'H',
            Flag::Sign => 'S',
            Flag::InterruptEnable => 'I',
            Flag::Transfer => 'X',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Flag::Zero => "zero",
            Flag::Carry => "carry",
            Flag::Overflow => "overflow",
            Flag::Parity => "parity",
            Flag::Trap => "trap",
            Flag::HalfCarry => "half-carry",
            Flag::Sign => "sign",
            Flag::InterruptEnable => "interrupt-enable",
            Flag::Transfer => "transfer",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Flag → status bit mapping
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagSet {
    positions: [u8; Flag::COUNT],
}

impl FlagSet {
    /// M1047 layout: Z C O P T H S I in the first byte, Transfer at bit 8
    pub const M1047: Self = Self {
        positions: [0, 1, 2, 3, 4, 5, 6, 7, 8],
    };

    /// Build a mapping from explicit positions.
    ///
    /// Returns `None` if two flags share a bit.
    pub fn new(positions: [u8; Flag::COUNT]) -> Option<Self> {
        for (i, a) in positions.iter().enumerate() {
            if positions[i + 1..].contains(a) {
                return None;
            }
        }
        Some(Self { positions })
    }

    /// Status bit holding `flag`
    #[inline]
    pub fn index(&self, flag: Flag) -> usize {
        self.positions[flag.ordinal()] as usize
    }

    /// Flag stored at status bit `index`, if any
    pub fn flag_at(&self, index: usize) -> Option<Flag> {
        Flag::ALL
            .iter()
            .copied()
            .find(|&flag| self.index(flag) == index)
    }

    /// Width of the status register: highest position + 1, rounded up to a byte
    pub fn status_bits(&self) -> usize {
        let highest = self.positions.iter().copied().max().unwrap_or(0) as usize;
        (highest + 1).div_ceil(8) * 8
    }
}

impl Default for FlagSet {
    fn default() -> Self {
        Self::M1047
    }
}
