//! Fixed-width integer arrays
//!
//! Register files, RAM, ROM and the analog / mapped I/O banks are all an
//! [`IntegerField`]: `len` cells sharing one width and signedness. Each
//! indexed operation is bounds-checked and reports `OutOfBounds` instead of
//! touching a neighbouring cell.

use crate::error::McuError;
use crate::integer::Width;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntegerField {
    width: Width,
    signed: bool,
    cells: Vec<u32>,
}

impl IntegerField {
    /// Create a zeroed field of `len` cells
    pub fn new(width: Width, len: usize, signed: bool) -> Self {
        Self {
            width,
            signed,
            cells: vec![0; len],
        }
    }

    pub fn unsigned(width: Width, len: usize) -> Self {
        Self::new(width, len, false)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    #[inline]
    fn check(&self, index: usize) -> Result<usize, McuError> {
        if index < self.cells.len() {
            Ok(index)
        } else {
            Err(McuError::OutOfBounds {
                index,
                len: self.cells.len(),
            })
        }
    }

    /// Value at `index`, sign-extended when the field is signed
    pub fn get(&self, index: usize) -> Result<i64, McuError> {
        let raw = self.cells[self.check(index)?];
        Ok(if self.signed {
            self.width.to_signed(raw)
        } else {
            raw as i64
        })
    }

    /// Raw bit pattern at `index`
    pub fn get_raw(&self, index: usize) -> Result<u32, McuError> {
        Ok(self.cells[self.check(index)?])
    }

    /// Store a value at `index`, wrapping it to the field width
    pub fn set(&mut self, index: usize, value: i64) -> Result<(), McuError> {
        let i = self.check(index)?;
        self.cells[i] = self.width.wrap(value);
        Ok(())
    }

    pub fn set_raw(&mut self, index: usize, raw: u32) -> Result<(), McuError> {
        let i = self.check(index)?;
        self.cells[i] = raw & self.width.mask();
        Ok(())
    }

    /// Zero a single cell
    pub fn clear_at(&mut self, index: usize) -> Result<(), McuError> {
        self.set_raw(index, 0)
    }

    /// Zero every cell
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn get_high(&self, index: usize) -> Result<u32, McuError> {
        Ok(self.get_raw(index)? >> self.width.half_bits())
    }

    pub fn get_low(&self, index: usize) -> Result<u32, McuError> {
        Ok(self.get_raw(index)? & self.width.half_mask())
    }

    pub fn set_high(&mut self, index: usize, value: u32) -> Result<(), McuError> {
        let i = self.check(index)?;
        let half = self.width.half_mask();
        self.cells[i] = (self.cells[i] & half) | ((value & half) << self.width.half_bits());
        Ok(())
    }

    pub fn set_low(&mut self, index: usize, value: u32) -> Result<(), McuError> {
        let i = self.check(index)?;
        let half = self.width.half_mask();
        self.cells[i] = (self.cells[i] & !half) | (value & half);
        Ok(())
    }

    /// Copy `data` into consecutive cells starting at `offset`.
    ///
    /// Nothing is written unless the whole range fits.
    pub fn load(&mut self, offset: usize, data: &[u32]) -> Result<(), McuError> {
        let end = offset.checked_add(data.len()).unwrap_or(usize::MAX);
        if end > self.cells.len() {
            return Err(McuError::OutOfBounds {
                index: end.saturating_sub(1),
                len: self.cells.len(),
            });
        }
        let mask = self.width.mask();
        for (cell, &value) in self.cells[offset..end].iter_mut().zip(data) {
            *cell = value & mask;
        }
        Ok(())
    }

    /// Raw contents, in index order
    pub fn as_raw(&self) -> &[u32] {
        &self.cells
    }

    /// Interpreted values, in index order
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        let width = self.width;
        let signed = self.signed;
        self.cells.iter().map(move |&raw| {
            if signed {
                width.to_signed(raw)
            } else {
                raw as i64
            }
        })
    }
}
