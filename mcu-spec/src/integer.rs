//! Fixed-width scalar storage
//!
//! An [`Integer`] holds one 8, 16 or 32-bit value as its raw bit pattern.
//! Writes never fail: any `i64` is truncated to the declared width with
//! two's-complement wraparound, the way a hardware register behaves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported storage widths
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Width {
    W8,
    W16,
    W32,
}

impl Width {
    /// Width for an exact bit count (8, 16 or 32)
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Width::W8),
            16 => Some(Width::W16),
            32 => Some(Width::W32),
            _ => None,
        }
    }

    /// Smallest width able to hold `bits` bits
    pub const fn fitting(bits: usize) -> Option<Self> {
        if bits <= 8 {
            Some(Width::W8)
        } else if bits <= 16 {
            Some(Width::W16)
        } else if bits <= 32 {
            Some(Width::W32)
        } else {
            None
        }
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
        }
    }

    /// Bits in the high/low sub-field (a nibble for W8, a half-word otherwise)
    #[inline]
    pub const fn half_bits(self) -> u32 {
        self.bits() / 2
    }

    /// All ones for this width
    #[inline]
    pub const fn mask(self) -> u32 {
        match self {
            Width::W8 => 0xFF,
            Width::W16 => 0xFFFF,
            Width::W32 => 0xFFFF_FFFF,
        }
    }

    #[inline]
    pub const fn half_mask(self) -> u32 {
        (1u32 << self.half_bits()) - 1
    }

    #[inline]
    pub const fn sign_bit(self) -> u32 {
        1u32 << (self.bits() - 1)
    }

    /// Number of distinct values (`2^bits`)
    #[inline]
    pub const fn capacity(self) -> u64 {
        1u64 << self.bits()
    }

    /// Truncate any integer to this width (modulo `2^bits`)
    #[inline]
    pub const fn wrap(self, value: i64) -> u32 {
        (value as u64 & self.mask() as u64) as u32
    }

    /// Interpret a raw pattern as two's complement
    #[inline]
    pub const fn to_signed(self, raw: u32) -> i64 {
        let shift = 64 - self.bits();
        (((raw as u64) << shift) as i64) >> shift
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// A single fixed-width scalar, signed or unsigned
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Integer {
    width: Width,
    signed: bool,
    raw: u32,
}

impl Integer {
    pub fn new(width: Width, signed: bool) -> Self {
        Self {
            width,
            signed,
            raw: 0,
        }
    }

    pub fn unsigned(width: Width) -> Self {
        Self::new(width, false)
    }

    pub fn signed(width: Width) -> Self {
        Self::new(width, true)
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Current value, sign-extended when the integer is signed
    #[inline]
    pub fn get(&self) -> i64 {
        if self.signed {
            self.width.to_signed(self.raw)
        } else {
            self.raw as i64
        }
    }

    /// Store a value, wrapping it to the declared width
    #[inline]
    pub fn set(&mut self, value: i64) {
        self.raw = self.width.wrap(value);
    }

    /// Raw bit pattern
    #[inline]
    pub fn raw(&self) -> u32 {
        self.raw
    }

    #[inline]
    pub fn set_raw(&mut self, raw: u32) {
        self.raw = raw & self.width.mask();
    }

    pub fn clear(&mut self) {
        self.raw = 0;
    }

    /// Upper nibble (W8) or upper half-word (W16/W32)
    #[inline]
    pub fn get_high(&self) -> u32 {
        self.raw >> self.width.half_bits()
    }

    /// Lower nibble (W8) or lower half-word (W16/W32)
    #[inline]
    pub fn get_low(&self) -> u32 {
        self.raw & self.width.half_mask()
    }

    pub fn set_high(&mut self, value: u32) {
        let half = self.width.half_mask();
        self.raw = (self.raw & half) | ((value & half) << self.width.half_bits());
    }

    pub fn set_low(&mut self, value: u32) {
        let half = self.width.half_mask();
        self.raw = (self.raw & !half) | (value & half);
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}
