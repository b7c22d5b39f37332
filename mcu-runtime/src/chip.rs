//! Chipset virtual machine

use crate::error::{Result, RuntimeError};
use crate::execute::{execute, Flow};
use crate::io::IoBanks;
use crate::snapshot::ChipSnapshot;
use crate::state::{
    ChipOptions, ChipState, Fault, FaultPolicy, InRegion, Lifecycle, Region, RunSummary,
    StopReason,
};
use mcu_disassembler::{decode, format, Decoded, DisassemblerError};
use mcu_spec::{Architecture, BitField, ChipConfig, ConfigError, Flag, IntegerField, Width};
use std::sync::Arc;

/// One chip instance: configuration, architecture and owned storage
#[derive(Debug, Clone)]
pub struct Chip {
    arch: Arc<Architecture>,
    config: ChipConfig,
    width: Width,
    options: ChipOptions,
    state: ChipState,
    lifecycle: Lifecycle,
    boots: u64,
    fault: Option<Fault>,
}

impl Chip {
    /// Create an M1047-family chip with default options
    pub fn new(config: ChipConfig) -> Result<Self> {
        Self::with_options(Architecture::m1047(), config, ChipOptions::default())
    }

    /// Create a chip of any family
    pub fn with_options(
        arch: Arc<Architecture>,
        config: ChipConfig,
        options: ChipOptions,
    ) -> Result<Self> {
        config.validate()?;
        let width = config.width().ok_or(ConfigError::UnsupportedBits)?;
        let state = ChipState::new(&config, width, &arch);

        Ok(Self {
            arch,
            config,
            width,
            options,
            state,
            lifecycle: Lifecycle::Constructed,
            boots: 0,
            fault: None,
        })
    }

    // ========== Lifecycle ==========

    /// Mark the chip running. A fresh chip starts with a clear status
    /// register; a halted chip resumes where it stopped.
    pub fn boot(&mut self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Booted => return Err(RuntimeError::AlreadyBooted),
            Lifecycle::Constructed => self.state.status.clear(),
            Lifecycle::Halted => {}
        }
        self.lifecycle = Lifecycle::Booted;
        self.boots += 1;
        tracing::debug!("boot #{} at IP={:04X}", self.boots, self.state.ip);
        Ok(())
    }

    /// Stop the chip; no-op unless booted
    pub fn halt(&mut self) {
        if self.lifecycle == Lifecycle::Booted {
            self.lifecycle = Lifecycle::Halted;
            tracing::debug!("halt at IP={:04X}", self.state.ip);
        }
    }

    /// Zero all storage and return to the constructed state
    pub fn reset(&mut self) {
        self.state.clear();
        self.lifecycle = Lifecycle::Constructed;
        self.fault = None;
        tracing::debug!("reset");
    }

    // ========== Execution ==========

    /// Execute exactly one fetch/decode/execute/advance step.
    ///
    /// Works in any lifecycle state, so a halted chip can be single-stepped.
    pub fn cycle(&mut self) -> Result<()> {
        self.step()?;
        Ok(())
    }

    /// Single-step until BREAK, a fault, or `max_cycles` cycles
    pub fn run(&mut self, max_cycles: u64) -> RunSummary {
        let mut cycles = 0;
        while cycles < max_cycles {
            cycles += 1;
            match self.step() {
                Ok(Flow::Break) => {
                    return RunSummary {
                        cycles,
                        reason: StopReason::Break,
                    }
                }
                Ok(_) => {}
                Err(fault) => {
                    return RunSummary {
                        cycles,
                        reason: StopReason::Fault(fault),
                    }
                }
            }
        }
        RunSummary {
            cycles,
            reason: StopReason::CycleLimit,
        }
    }

    fn step(&mut self) -> std::result::Result<Flow, Fault> {
        let ip = self.state.ip;
        let arch = Arc::clone(&self.arch);

        let outcome = self.fetch_sized(&arch, ip).and_then(|decoded| {
            tracing::trace!(
                "[{:6}] IP={:04X} {}",
                self.state.cycles,
                ip,
                format(&decoded)
            );
            let size = decoded.size() as u32;
            execute(&arch, self.width, &decoded, &mut self.state)
                .map(|flow| (flow, size))
                .map_err(|fault| (fault, size))
        });

        match outcome {
            Ok((flow, size)) => {
                self.state.ip = match flow {
                    Flow::Jump(target) => target,
                    Flow::Next | Flow::Break => self.width.wrap(ip as i64 + size as i64),
                };
                self.state.inc_cycles();
                if flow == Flow::Break {
                    tracing::debug!("BREAK at IP={:04X}", ip);
                    self.lifecycle = Lifecycle::Halted;
                }
                Ok(flow)
            }
            Err((fault, size)) => {
                tracing::warn!("{}", fault);
                if self.options.fault_policy == FaultPolicy::Skip {
                    self.state.ip = self.width.wrap(ip as i64 + size as i64);
                }
                self.lifecycle = Lifecycle::Halted;
                self.fault = Some(fault.clone());
                Err(fault)
            }
        }
    }

    /// Fetch and decode the instruction at `ip`.
    ///
    /// A failed fetch also reports how many cells the skip policy steps over.
    fn fetch_sized<'a>(
        &self,
        arch: &'a Architecture,
        ip: u32,
    ) -> std::result::Result<Decoded<'a>, (Fault, u32)> {
        let program = self.state.memory.program();
        let region = self.state.memory.program_region();
        let len = program.len() as u64;

        let cells = program
            .as_raw()
            .get(ip as usize..)
            .filter(|cells| !cells.is_empty())
            .ok_or((Fault::bounds(ip, region, ip as u64, len), 1u32))?;

        decode(arch, self.width, cells).map_err(|err| match err {
            DisassemblerError::UnknownOpcode(opcode) => (
                Fault::IllegalInstruction {
                    ip,
                    opcode: opcode as u32,
                },
                1,
            ),
            DisassemblerError::InvalidCell(cell) => {
                (Fault::IllegalInstruction { ip, opcode: cell }, 1)
            }
            // Skip covers the whole instruction, as for an execute fault
            DisassemblerError::Truncated {
                needed, available, ..
            } => (
                Fault::bounds(ip, region, ip as u64 + available as u64, len),
                needed as u32,
            ),
        })
    }

    /// Assembly text of the instruction at `ip`
    pub fn disassemble_at(&self, ip: u32) -> Result<String> {
        let decoded = self
            .fetch_sized(&self.arch, ip)
            .map_err(|(fault, _)| fault)?;
        Ok(format(&decoded))
    }

    // ========== Host access ==========

    /// Write program cells (ROM, or RAM when the chip has no ROM)
    pub fn load_program(&mut self, offset: usize, cells: &[u32]) -> Result<()> {
        Ok(self.state.memory.load_program(offset, cells)?)
    }

    pub fn load_ram(&mut self, offset: usize, cells: &[u32]) -> Result<()> {
        Ok(self.state.memory.load_ram(offset, cells)?)
    }

    /// Set a register, wrapping the value to the word width
    pub fn set_register(&mut self, index: usize, value: i64) -> Result<()> {
        Ok(self.state.registers.set(index, value)?)
    }

    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        let index = self.arch.flags().index(flag);
        if let Err(err) = self.state.status.set(index, value) {
            tracing::warn!("set_flag {:?}: {}", flag, err);
        }
    }

    pub fn set_stack_pointer(&mut self, sp: u32) {
        self.state.sp = sp & self.width.mask();
    }

    pub fn set_instruction_pointer(&mut self, ip: u32) {
        self.state.ip = ip & self.width.mask();
    }

    /// I/O banks, for peripherals driving pins and channels
    pub fn io_mut(&mut self) -> &mut IoBanks {
        &mut self.state.io
    }

    /// Forget the recorded fault
    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    // ========== Introspection ==========

    pub fn arch(&self) -> &Arc<Architecture> {
        &self.arch
    }

    pub fn config(&self) -> &ChipConfig {
        &self.config
    }

    pub fn options(&self) -> &ChipOptions {
        &self.options
    }

    pub fn width(&self) -> Width {
        self.width
    }

    pub fn registers(&self) -> &IntegerField {
        &self.state.registers
    }

    /// Raw value of register `index`
    pub fn register(&self, index: usize) -> Result<u32> {
        Ok(self.state.registers.get_raw(index)?)
    }

    /// The status register
    pub fn flags(&self) -> &BitField {
        &self.state.status
    }

    pub fn flag(&self, flag: Flag) -> bool {
        let index = self.arch.flags().index(flag);
        self.state.status.get(index).unwrap_or(false)
    }

    pub fn ram(&self) -> &IntegerField {
        self.state.memory.ram()
    }

    pub fn rom(&self) -> Option<&IntegerField> {
        self.state.memory.rom()
    }

    pub fn io(&self) -> &IoBanks {
        &self.state.io
    }

    pub fn stack_pointer(&self) -> u32 {
        self.state.sp
    }

    pub fn instruction_pointer(&self) -> u32 {
        self.state.ip
    }

    pub fn cycles(&self) -> u64 {
        self.state.cycles
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_booted(&self) -> bool {
        self.lifecycle == Lifecycle::Booted
    }

    /// Number of successful boots; identifies the current run
    pub fn boot_count(&self) -> u64 {
        self.boots
    }

    /// Last fault, until cleared or reset
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    // ========== Snapshots ==========

    /// Copy of the complete chip state
    pub fn snapshot(&self) -> ChipSnapshot {
        let io = &self.state.io;
        ChipSnapshot {
            config: self.config,
            lifecycle: self.lifecycle,
            registers: self.state.registers.as_raw().to_vec(),
            status: self.state.status.as_bytes().to_vec(),
            ram: self.ram().as_raw().to_vec(),
            rom: self.rom().map(|rom| rom.as_raw().to_vec()),
            digital: io.digital().as_bytes().to_vec(),
            analog: io.analog().as_raw().to_vec(),
            mapped: io.mapped().as_raw().to_vec(),
            sp: self.state.sp,
            ip: self.state.ip,
            cycles: self.state.cycles,
            fault: self.fault.clone(),
        }
    }

    /// Rebuild a chip from a snapshot.
    ///
    /// A snapshot taken while booted restores as halted: the restored chip
    /// has no driver until booted again.
    pub fn from_snapshot(
        arch: Arc<Architecture>,
        snapshot: &ChipSnapshot,
        options: ChipOptions,
    ) -> Result<Self> {
        let mut chip = Self::with_options(arch, snapshot.config, options)?;
        chip.restore(snapshot).map_err(|fault| {
            RuntimeError::Snapshot(format!("snapshot does not match its configuration: {}", fault))
        })?;
        Ok(chip)
    }

    fn restore(&mut self, snapshot: &ChipSnapshot) -> std::result::Result<(), Fault> {
        let state = &mut self.state;
        let exact = |region: Region, found: usize, len: usize| {
            if found == len {
                Ok(())
            } else {
                Err(Fault::BoundsFault {
                    ip: snapshot.ip,
                    region,
                    index: found as u64,
                    len: len as u64,
                })
            }
        };

        exact(Region::Registers, snapshot.registers.len(), state.registers.len())?;
        state.registers.load(0, &snapshot.registers).in_region(snapshot.ip, Region::Registers)?;
        state.status.load_bytes(&snapshot.status).in_region(snapshot.ip, Region::Status)?;

        exact(Region::Ram, snapshot.ram.len(), state.memory.ram().len())?;
        state.memory.load_ram(0, &snapshot.ram).in_region(snapshot.ip, Region::Ram)?;
        match (&snapshot.rom, state.memory.rom().map(|rom| rom.len())) {
            (Some(rom), Some(len)) => {
                exact(Region::Rom, rom.len(), len)?;
                state.memory.load_program(0, rom).in_region(snapshot.ip, Region::Rom)?;
            }
            (None, None) => {}
            (rom, len) => {
                return Err(Fault::BoundsFault {
                    ip: snapshot.ip,
                    region: Region::Rom,
                    index: rom.as_ref().map_or(0, |r| r.len() as u64),
                    len: len.unwrap_or(0) as u64,
                })
            }
        }

        let io = &mut state.io;
        io.load(&snapshot.digital, &snapshot.analog, &snapshot.mapped)
            .in_region(snapshot.ip, Region::Io)?;

        state.sp = snapshot.sp & self.width.mask();
        state.ip = snapshot.ip & self.width.mask();
        state.cycles = snapshot.cycles;
        self.fault = snapshot.fault.clone();
        self.lifecycle = match snapshot.lifecycle {
            Lifecycle::Booted => Lifecycle::Halted,
            other => other,
        };
        Ok(())
    }
}
