//! I/O address map
//!
//! Fixed offsets in the I/O address space, so peripheral simulators can attach
//! to a chip without knowing its configuration:
//!
//! ```text
//! Address      Contents
//! ──────────────────────────────────────────────
//! 0x00-0x07    digital ports, 8 pins each (pin 8p+0 is bit 7 of port p)
//! 0x08-0x0F    analog channels 0-7
//! 0x1D         stack pointer
//! 0x20-        memory-mapped channels
//! ```

use serde::{Deserialize, Serialize};

/// First digital port
pub const DIGITAL_BASE: u32 = 0x00;

/// Number of digital ports
pub const DIGITAL_PORTS: u32 = 8;

/// Maximum digital pins
pub const DIGITAL_PINS: u32 = DIGITAL_PORTS * 8;

/// First analog channel
pub const ANALOG_BASE: u32 = 0x08;

/// Maximum analog channels
pub const ANALOG_CHANNELS: u32 = 8;

/// Stack pointer
pub const STACK_POINTER: u32 = 0x1D;

/// First memory-mapped channel
pub const MAPPED_BASE: u32 = 0x20;

/// What an I/O address refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IoTarget {
    /// Digital port (index into the pin field's bytes)
    Digital(usize),
    /// Analog channel
    Analog(usize),
    /// The stack pointer
    StackPointer,
    /// Memory-mapped channel
    Mapped(usize),
    /// Reserved gap in the map
    Reserved,
}

/// Resolve an I/O address to its target
pub fn resolve(address: u32) -> IoTarget {
    match address {
        a if a < DIGITAL_BASE + DIGITAL_PORTS => IoTarget::Digital((a - DIGITAL_BASE) as usize),
        a if (ANALOG_BASE..ANALOG_BASE + ANALOG_CHANNELS).contains(&a) => {
            IoTarget::Analog((a - ANALOG_BASE) as usize)
        }
        STACK_POINTER => IoTarget::StackPointer,
        a if a >= MAPPED_BASE => IoTarget::Mapped((a - MAPPED_BASE) as usize),
        _ => IoTarget::Reserved,
    }
}
