//! # Chipset Configuration
//!
//! The parameters fixing one chip instance: word width, register count,
//! memory sizes, I/O channel counts and clock speed. RAM and ROM sizes larger
//! than the addressable range are clamped to `2^bits`; everything else that
//! does not fit is rejected by [`ChipConfig::validate`].

use crate::integer::Width;
use crate::io::{ANALOG_CHANNELS, DIGITAL_PINS, MAPPED_BASE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// I/O channel counts per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IoChannels {
    /// Bit-addressable digital pins
    pub digital: u32,
    /// Analog channels
    pub analog: u32,
    /// Memory-mapped channels
    pub mapped: u32,
}

/// Hardware configuration of one chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChipConfig {
    /// Word width in bits (8, 16 or 32)
    pub bits: u8,
    /// Number of general-purpose registers
    pub registers: u32,
    /// RAM cells
    pub ram: u32,
    /// ROM cells (0 = no ROM, programs run from RAM)
    pub rom: u32,
    /// I/O channel counts
    pub io: IoChannels,
    /// Clock speed in cycles per second
    pub speed: u32,
}

impl ChipConfig {
    /// The M1047 part
    /// - 8-bit words, 8 registers
    /// - 4 digital pins, 2 analog channels, 32 mapped channels
    /// - 256 cells of RAM, 64 cells of ROM
    /// - 16 Hz clock
    pub const M1047: Self = Self {
        bits: 8,
        registers: 8,
        ram: 256,
        rom: 64,
        io: IoChannels {
            digital: 4,
            analog: 2,
            mapped: 32,
        },
        speed: 16,
    };

    /// Word width, if `bits` is supported
    pub const fn width(&self) -> Option<Width> {
        Width::from_bits(self.bits as u32)
    }

    /// Addressable range (`2^bits`)
    pub const fn address_space(&self) -> u64 {
        match 1u64.checked_shl(self.bits as u32) {
            Some(space) => space,
            None => u64::MAX,
        }
    }

    /// RAM cells after clamping to the address space
    pub fn ram_size(&self) -> usize {
        (self.ram as u64).min(self.address_space()) as usize
    }

    /// ROM cells after clamping to the address space
    pub fn rom_size(&self) -> usize {
        (self.rom as u64).min(self.address_space()) as usize
    }

    /// Whether programs are fetched from ROM
    pub const fn has_rom(&self) -> bool {
        self.rom > 0
    }

    /// Tick period of the periodic driver, in nanoseconds (`1000 / speed` ms)
    pub const fn tick_nanos(&self) -> u64 {
        if self.speed == 0 {
            0
        } else {
            1_000_000_000 / self.speed as u64
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width().is_none() {
            return Err(ConfigError::UnsupportedBits);
        }
        if self.registers == 0 {
            return Err(ConfigError::NoRegisters);
        }
        if self.registers as u64 > self.address_space() {
            return Err(ConfigError::TooManyRegisters);
        }
        if self.ram == 0 {
            return Err(ConfigError::NoRam);
        }
        if self.speed == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        if self.io.digital > DIGITAL_PINS {
            return Err(ConfigError::TooManyDigital);
        }
        if self.io.analog > ANALOG_CHANNELS {
            return Err(ConfigError::TooManyAnalog);
        }
        if self.io.mapped as u64 > self.address_space() - MAPPED_BASE as u64 {
            return Err(ConfigError::TooManyMapped);
        }

        Ok(())
    }
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self::M1047
    }
}

impl fmt::Display for ChipConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChipConfig {{ {}-bit, {} registers, ram: {}, rom: {}, io: {}d/{}a/{}m, {} Hz }}",
            self.bits,
            self.registers,
            self.ram_size(),
            self.rom_size(),
            self.io.digital,
            self.io.analog,
            self.io.mapped,
            self.speed,
        )
    }
}

/// Configuration error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    /// Word width must be 8, 16 or 32
    UnsupportedBits,
    /// At least one register is required
    NoRegisters,
    /// Register indices must fit in a word
    TooManyRegisters,
    /// RAM must not be empty
    NoRam,
    /// Clock speed must be positive
    ZeroSpeed,
    /// Digital pins must fit the digital port range
    TooManyDigital,
    /// Analog channels must fit the analog range
    TooManyAnalog,
    /// Mapped channels must fit the address space above the mapped base
    TooManyMapped,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedBits => write!(f, "bits must be 8, 16 or 32"),
            ConfigError::NoRegisters => write!(f, "registers must be positive"),
            ConfigError::TooManyRegisters => {
                write!(f, "registers must not exceed the address space")
            }
            ConfigError::NoRam => write!(f, "ram must be positive"),
            ConfigError::ZeroSpeed => write!(f, "speed must be positive"),
            ConfigError::TooManyDigital => {
                write!(f, "digital pins must be at most {}", DIGITAL_PINS)
            }
            ConfigError::TooManyAnalog => {
                write!(f, "analog channels must be at most {}", ANALOG_CHANNELS)
            }
            ConfigError::TooManyMapped => {
                write!(f, "mapped channels must fit above {:#04x}", MAPPED_BASE)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
