//! I/O banks
//!
//! Digital pins live in a [`BitField`], eight pins per port; analog and
//! memory-mapped channels are cells of the chip's word width. The stack
//! pointer slot of the I/O map is owned by the chip, not by the banks.

use crate::state::Region;
use mcu_spec::io::{resolve, IoTarget};
use mcu_spec::{BitField, ChipConfig, IntegerField, McuError, Width};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoBanks {
    digital: BitField,
    analog: IntegerField,
    mapped: IntegerField,
}

impl IoBanks {
    pub fn new(config: &ChipConfig, width: Width) -> Self {
        Self {
            digital: BitField::new(config.io.digital as usize),
            analog: IntegerField::unsigned(width, config.io.analog as usize),
            mapped: IntegerField::unsigned(width, config.io.mapped as usize),
        }
    }

    pub fn digital(&self) -> &BitField {
        &self.digital
    }

    pub fn analog(&self) -> &IntegerField {
        &self.analog
    }

    pub fn mapped(&self) -> &IntegerField {
        &self.mapped
    }

    /// Digital pin `pin`
    pub fn pin(&self, pin: usize) -> Result<bool, McuError> {
        self.digital.get(pin)
    }

    /// Drive digital pin `pin`
    pub fn set_pin(&mut self, pin: usize, value: bool) -> Result<(), McuError> {
        self.digital.set(pin, value)
    }

    /// Drive an analog channel from outside the chip
    pub fn set_analog(&mut self, channel: usize, value: u32) -> Result<(), McuError> {
        self.analog.set_raw(channel, value)
    }

    /// Drive a mapped channel from outside the chip
    pub fn set_mapped(&mut self, channel: usize, value: u32) -> Result<(), McuError> {
        self.mapped.set_raw(channel, value)
    }

    /// Read the bank cell behind `target`.
    ///
    /// Returns `None` for targets the banks do not own (stack pointer, gaps).
    pub fn read(&self, target: IoTarget) -> Option<Result<u32, McuError>> {
        match target {
            IoTarget::Digital(port) => Some(self.digital.unit(port).map(u32::from)),
            IoTarget::Analog(channel) => Some(self.analog.get_raw(channel)),
            IoTarget::Mapped(channel) => Some(self.mapped.get_raw(channel)),
            IoTarget::StackPointer | IoTarget::Reserved => None,
        }
    }

    /// Write the bank cell behind `target`; digital ports take the low byte
    pub fn write(&mut self, target: IoTarget, value: u32) -> Option<Result<(), McuError>> {
        match target {
            IoTarget::Digital(port) => Some(self.digital.set_unit(port, value as u8)),
            IoTarget::Analog(channel) => Some(self.analog.set_raw(channel, value)),
            IoTarget::Mapped(channel) => Some(self.mapped.set_raw(channel, value)),
            IoTarget::StackPointer | IoTarget::Reserved => None,
        }
    }

    /// Read by I/O address
    pub fn read_address(&self, address: u32) -> Option<Result<u32, McuError>> {
        self.read(resolve(address))
    }

    /// Replace every bank; each slice must match its bank's size
    pub fn load(
        &mut self,
        digital: &[u8],
        analog: &[u32],
        mapped: &[u32],
    ) -> Result<(), McuError> {
        for (found, len) in [
            (analog.len(), self.analog.len()),
            (mapped.len(), self.mapped.len()),
        ] {
            if found != len {
                return Err(McuError::OutOfBounds { index: found, len });
            }
        }
        self.digital.load_bytes(digital)?;
        self.analog.load(0, analog)?;
        self.mapped.load(0, mapped)
    }

    pub fn clear(&mut self) {
        self.digital.clear();
        self.analog.clear();
        self.mapped.clear();
    }
}

/// Storage region an I/O target lives in
pub fn region(target: IoTarget) -> Region {
    match target {
        IoTarget::Digital(_) => Region::Digital,
        IoTarget::Analog(_) => Region::Analog,
        IoTarget::Mapped(_) => Region::Mapped,
        IoTarget::StackPointer | IoTarget::Reserved => Region::Io,
    }
}
