//! # M1047 Chipset Runtime
//!
//! Virtual machine for 8-bit MCU chipsets described by an
//! [`Architecture`](mcu_spec::Architecture).
//!
//! A [`Chip`] owns its registers, status register, RAM, optional ROM and
//! I/O banks, and executes one instruction per [`Chip::cycle`]. The
//! [`driver`] module runs a shared chip on a background thread at its
//! configured clock speed.
//!
//! ## Features
//!
//! - **Cycle engine**: fetch, decode, execute and advance, one instruction per cycle
//! - **Atomic faults**: a faulting instruction leaves every register, cell and flag untouched
//! - **Fault policy**: halt on the faulting instruction or step past it
//! - **Periodic driver**: one cycle per `1 / speed` seconds, missed ticks dropped
//! - **Snapshots**: full state capture, binary images and SHA-256 digests
//!
//! ## Example
//!
//! ```rust,no_run
//! use mcu_runtime::{Chip, StopReason};
//! use mcu_spec::{encode, ChipConfig};
//!
//! let mut chip = Chip::new(ChipConfig::M1047).unwrap();
//! let mut program = encode(chip.arch(), chip.width(), "LDI", &[0, 42]).unwrap();
//! program.extend(encode(chip.arch(), chip.width(), "BREAK", &[]).unwrap());
//! chip.load_program(0, &program).unwrap();
//!
//! let summary = chip.run(100);
//! assert_eq!(summary.reason, StopReason::Break);
//! println!("r0 = {}", chip.register(0).unwrap());
//! ```

pub mod alu;
pub mod chip;
pub mod driver;
pub mod error;
pub mod execute;
pub mod io;
pub mod memory;
pub mod snapshot;
pub mod state;

pub use chip::Chip;
pub use driver::{boot, shared, Driver, SharedChip};
pub use error::{Result, RuntimeError};
pub use execute::Flow;
pub use io::IoBanks;
pub use memory::Memory;
pub use snapshot::ChipSnapshot;
pub use state::{
    ChipOptions, ChipState, Fault, FaultPolicy, Lifecycle, Region, RunSummary, StopReason,
};

use mcu_spec::ChipConfig;

/// Simple execution helper
///
/// Loads `program` into an M1047-family chip built from `config`, boots it
/// and single-steps until BREAK, a fault, or `max_cycles`.
pub fn run(config: ChipConfig, program: &[u32], max_cycles: u64) -> Result<(Chip, RunSummary)> {
    let mut chip = Chip::new(config)?;
    chip.load_program(0, program)?;
    chip.boot()?;
    let summary = chip.run(max_cycles);
    Ok((chip, summary))
}
