//! # M1047 Chipset Specification
//!
//! Storage primitives and architecture data for a small register-based
//! microcontroller family.
//!
//! ## Key Features
//! - 8, 16 or 32-bit word width, chosen per chip
//! - Bit-addressable status register with a per-family flag layout
//! - Table-driven instruction set: one opcode cell plus one cell per operand
//! - Fixed I/O address map (digital ports, analog channels, mapped channels)
//! - Separate ROM, or programs fetched from RAM when ROM is absent

pub mod arch;
pub mod bit_field;
pub mod config;
pub mod encoding;
pub mod error;
pub mod flags;
pub mod instruction;
pub mod integer;
pub mod integer_field;
pub mod io;
pub mod opcode;
pub mod operand;

pub use arch::Architecture;
pub use bit_field::{BitField, Bits};
pub use config::{ChipConfig, ConfigError, IoChannels};
pub use encoding::encode;
pub use error::McuError;
pub use flags::{Flag, FlagSet};
pub use instruction::{InstructionDescriptor, InstructionTable};
pub use integer::{Integer, Width};
pub use integer_field::IntegerField;
pub use io::IoTarget;
pub use opcode::Operation;
pub use operand::{OperandKind, Pointer};

/// Memory cell value (raw pattern of the chip's word width)
pub type Cell = u32;
