//! Bit-addressable storage
//!
//! Bits are packed eight to a byte, most-significant bit first: index `i`
//! lives in unit `i >> 3` under mask `0x80 >> (i % 8)`. The status register
//! and the digital I/O pins are both a [`BitField`].

use crate::error::McuError;
use crate::integer::{Integer, Width};
use std::iter::FusedIterator;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitField {
    len: usize,
    units: Vec<u8>,
}

#[inline]
const fn mask(index: usize) -> u8 {
    0x80 >> (index % 8)
}

impl BitField {
    /// Create a cleared field of `len` bits
    pub fn new(len: usize) -> Self {
        Self {
            len,
            units: vec![0; len.div_ceil(8)],
        }
    }

    /// Number of bits
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of backing bytes
    #[inline]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    #[inline]
    fn check(&self, index: usize) -> Result<usize, McuError> {
        if index < self.len {
            Ok(index)
        } else {
            Err(McuError::OutOfBounds {
                index,
                len: self.len,
            })
        }
    }

    #[inline]
    fn bit(&self, index: usize) -> bool {
        self.units[index >> 3] & mask(index) != 0
    }

    pub fn get(&self, index: usize) -> Result<bool, McuError> {
        Ok(self.bit(self.check(index)?))
    }

    pub fn set(&mut self, index: usize, value: bool) -> Result<(), McuError> {
        let i = self.check(index)?;
        if value {
            self.units[i >> 3] |= mask(i);
        } else {
            self.units[i >> 3] &= !mask(i);
        }
        Ok(())
    }

    pub fn clear_bit(&mut self, index: usize) -> Result<(), McuError> {
        self.set(index, false)
    }

    /// Clear every bit
    pub fn clear(&mut self) {
        self.units.fill(0);
    }

    /// Backing byte `unit`, bit 7 holding index `8 * unit`
    pub fn unit(&self, unit: usize) -> Result<u8, McuError> {
        self.units
            .get(unit)
            .copied()
            .ok_or(McuError::OutOfBounds {
                index: unit,
                len: self.units.len(),
            })
    }

    /// Overwrite backing byte `unit`. Padding bits past `len` stay clear.
    pub fn set_unit(&mut self, unit: usize, value: u8) -> Result<(), McuError> {
        let valid = self.unit_mask(unit)?;
        self.units[unit] = value & valid;
        Ok(())
    }

    fn unit_mask(&self, unit: usize) -> Result<u8, McuError> {
        if unit >= self.units.len() {
            return Err(McuError::OutOfBounds {
                index: unit,
                len: self.units.len(),
            });
        }
        let used = (self.len - unit * 8).min(8);
        Ok(!(0xFFu8.checked_shr(used as u32).unwrap_or(0)))
    }

    /// Replace all backing bytes
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), McuError> {
        if bytes.len() != self.units.len() {
            return Err(McuError::OutOfBounds {
                index: bytes.len(),
                len: self.units.len(),
            });
        }
        for (unit, &byte) in bytes.iter().enumerate() {
            self.set_unit(unit, byte)?;
        }
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.units
    }

    /// Big-endian concatenation of the backing bytes.
    ///
    /// Fields wider than 64 bits keep only their trailing eight bytes.
    pub fn value(&self) -> u64 {
        self.units
            .iter()
            .fold(0u64, |acc, &byte| (acc << 8) | byte as u64)
    }

    /// The aggregate value as an unsigned [`Integer`] of matching width
    pub fn to_integer(&self) -> Result<Integer, McuError> {
        let width = Width::fitting(self.len).ok_or(McuError::UnsupportedWidth(self.len))?;
        let mut integer = Integer::unsigned(width);
        // Left-aligned inside the width, like the backing bytes
        let shift = width.bits() as usize - self.units.len() * 8;
        integer.set_raw((self.value() as u32) << shift);
        Ok(integer)
    }

    /// Lazy iterator over the bits in index order; call again to restart
    pub fn iter(&self) -> Bits<'_> {
        Bits {
            field: self,
            front: 0,
            back: self.len,
        }
    }

    /// Indices of the set bits
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter()
            .enumerate()
            .filter_map(|(i, bit)| bit.then_some(i))
    }
}

impl<'a> IntoIterator for &'a BitField {
    type Item = bool;
    type IntoIter = Bits<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Finite iterator over a [`BitField`]
#[derive(Clone, Debug)]
pub struct Bits<'a> {
    field: &'a BitField,
    front: usize,
    back: usize,
}

impl Iterator for Bits<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.front >= self.back {
            return None;
        }
        let bit = self.field.bit(self.front);
        self.front += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for Bits<'_> {
    fn next_back(&mut self) -> Option<bool> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.field.bit(self.back))
    }
}

impl ExactSizeIterator for Bits<'_> {}

impl FusedIterator for Bits<'_> {}
