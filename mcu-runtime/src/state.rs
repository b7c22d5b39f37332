//! Chip state, lifecycle and faults

use crate::io::IoBanks;
use crate::memory::Memory;
use mcu_spec::{Architecture, BitField, ChipConfig, IntegerField, McuError, Width};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Storage area a bounds fault refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Registers,
    Status,
    Ram,
    Rom,
    Digital,
    Analog,
    Mapped,
    Io,
    Stack,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Registers => "registers",
            Region::Status => "status",
            Region::Ram => "ram",
            Region::Rom => "rom",
            Region::Digital => "digital",
            Region::Analog => "analog",
            Region::Mapped => "mapped",
            Region::Io => "io",
            Region::Stack => "stack",
        };
        write!(f, "{}", name)
    }
}

/// Fault register contents
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum Fault {
    /// Opcode cell with no instruction table entry
    #[error("Illegal instruction {opcode:#04x} at {ip:#06x}")]
    IllegalInstruction { ip: u32, opcode: u32 },

    /// Access outside a storage area
    #[error("Bounds fault at {ip:#06x}: {region} index {index} out of range (size {len})")]
    BoundsFault {
        ip: u32,
        region: Region,
        index: u64,
        len: u64,
    },
}

impl Fault {
    /// Address of the faulting instruction
    pub fn ip(&self) -> u32 {
        match self {
            Fault::IllegalInstruction { ip, .. } | Fault::BoundsFault { ip, .. } => *ip,
        }
    }

    pub(crate) fn bounds(ip: u32, region: Region, index: u64, len: u64) -> Self {
        Fault::BoundsFault {
            ip,
            region,
            index,
            len,
        }
    }
}

/// Attach the faulting address and region to a storage error
pub(crate) trait InRegion<T> {
    fn in_region(self, ip: u32, region: Region) -> Result<T, Fault>;
}

impl<T> InRegion<T> for Result<T, McuError> {
    fn in_region(self, ip: u32, region: Region) -> Result<T, Fault> {
        self.map_err(|err| match err {
            McuError::OutOfBounds { index, len } => {
                Fault::bounds(ip, region, index as u64, len as u64)
            }
            _ => Fault::bounds(ip, region, 0, 0),
        })
    }
}

/// Chip lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    #[default]
    Constructed,
    Booted,
    Halted,
}

/// What a fault does to the instruction pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FaultPolicy {
    /// Stay on the faulting instruction
    #[default]
    Halt,
    /// Advance past the faulting instruction
    Skip,
}

/// VM behaviour options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChipOptions {
    /// What happens to IP after a fault; the chip halts either way
    pub fault_policy: FaultPolicy,
}

/// Why a [`Chip::run`](crate::Chip::run) loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// BREAK executed
    Break,
    /// A cycle faulted
    Fault(Fault),
    /// The cycle budget ran out
    CycleLimit,
}

/// Result of a [`Chip::run`](crate::Chip::run) loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles executed by this run, including a faulting one
    pub cycles: u64,
    pub reason: StopReason,
}

/// Storage owned by one chip
#[derive(Debug, Clone)]
pub struct ChipState {
    /// General-purpose registers
    pub registers: IntegerField,
    /// Status register, laid out by the architecture's flag set
    pub status: BitField,
    /// RAM and ROM
    pub memory: Memory,
    /// Digital, analog and mapped channels
    pub io: IoBanks,
    /// Stack pointer
    pub sp: u32,
    /// Instruction pointer
    pub ip: u32,
    /// Cycles executed since construction or reset
    pub cycles: u64,
}

impl ChipState {
    /// Zeroed state for a validated configuration
    pub fn new(config: &ChipConfig, width: Width, arch: &Architecture) -> Self {
        Self {
            registers: IntegerField::unsigned(width, config.registers as usize),
            status: BitField::new(arch.status_bits()),
            memory: Memory::new(config, width),
            io: IoBanks::new(config, width),
            sp: 0,
            ip: 0,
            cycles: 0,
        }
    }

    /// Zero all storage in place
    pub fn clear(&mut self) {
        self.registers.clear();
        self.status.clear();
        self.memory.clear();
        self.io.clear();
        self.sp = 0;
        self.ip = 0;
        self.cycles = 0;
    }

    #[inline]
    pub fn inc_cycles(&mut self) {
        self.cycles += 1;
    }
}
