//! Memory subsystem
//!
//! RAM holds data and the stack. ROM, when the chip has one, holds the
//! program; without ROM the program is fetched from RAM.

use crate::state::Region;
use mcu_spec::{ChipConfig, IntegerField, McuError, Width};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    ram: IntegerField,
    rom: Option<IntegerField>,
}

impl Memory {
    pub fn new(config: &ChipConfig, width: Width) -> Self {
        let rom = config
            .has_rom()
            .then(|| IntegerField::unsigned(width, config.rom_size()));
        Memory {
            ram: IntegerField::unsigned(width, config.ram_size()),
            rom,
        }
    }

    pub fn ram(&self) -> &IntegerField {
        &self.ram
    }

    pub fn rom(&self) -> Option<&IntegerField> {
        self.rom.as_ref()
    }

    /// Memory instructions are fetched from
    pub fn program(&self) -> &IntegerField {
        self.rom.as_ref().unwrap_or(&self.ram)
    }

    pub fn program_mut(&mut self) -> &mut IntegerField {
        self.rom.as_mut().unwrap_or(&mut self.ram)
    }

    /// Region reported when a fetch runs off program memory
    pub fn program_region(&self) -> Region {
        if self.rom.is_some() {
            Region::Rom
        } else {
            Region::Ram
        }
    }

    /// Write program cells starting at `offset`
    pub fn load_program(&mut self, offset: usize, cells: &[u32]) -> Result<(), McuError> {
        self.program_mut().load(offset, cells)
    }

    /// Write data cells into RAM starting at `offset`
    pub fn load_ram(&mut self, offset: usize, cells: &[u32]) -> Result<(), McuError> {
        self.ram.load(offset, cells)
    }

    /// Read one RAM cell
    #[inline]
    pub fn read(&self, address: u64) -> Result<u32, McuError> {
        self.ram.get_raw(self.index(address))
    }

    /// Write one RAM cell
    #[inline]
    pub fn write(&mut self, address: u64, value: u32) -> Result<(), McuError> {
        let index = self.index(address);
        self.ram.set_raw(index, value)
    }

    // Addresses past usize::MAX are out of range anyway
    fn index(&self, address: u64) -> usize {
        usize::try_from(address).unwrap_or(usize::MAX)
    }

    pub fn clear(&mut self) {
        self.ram.clear();
        if let Some(rom) = self.rom.as_mut() {
            rom.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_rom() -> ChipConfig {
        ChipConfig {
            rom: 0,
            ..ChipConfig::M1047
        }
    }

    #[test]
    fn test_program_comes_from_rom() {
        let mut memory = Memory::new(&ChipConfig::M1047, Width::W8);
        memory.load_program(0, &[1, 2, 3]).unwrap();
        assert_eq!(memory.program_region(), Region::Rom);
        assert_eq!(memory.rom().unwrap().get_raw(2), Ok(3));
        assert_eq!(memory.ram().get_raw(2), Ok(0));
        assert_eq!(memory.program().len(), 64);
    }

    #[test]
    fn test_program_falls_back_to_ram() {
        let mut memory = Memory::new(&no_rom(), Width::W8);
        assert!(memory.rom().is_none());
        memory.load_program(4, &[9]).unwrap();
        assert_eq!(memory.read(4), Ok(9));
        assert_eq!(memory.program_region(), Region::Ram);
    }

    #[test]
    fn test_read_write_bounds() {
        let mut memory = Memory::new(&no_rom(), Width::W8);
        memory.write(255, 0x1FF).unwrap();
        assert_eq!(memory.read(255), Ok(0xFF));
        assert!(memory.read(256).unwrap_err().is_bounds());
        assert!(memory.write(u64::MAX, 0).is_err());
    }

    #[test]
    fn test_clear() {
        let mut memory = Memory::new(&ChipConfig::M1047, Width::W8);
        memory.load_ram(0, &[1, 2]).unwrap();
        memory.load_program(0, &[3]).unwrap();
        memory.clear();
        assert!(memory.ram().iter().all(|v| v == 0));
        assert!(memory.program().iter().all(|v| v == 0));
    }
}
