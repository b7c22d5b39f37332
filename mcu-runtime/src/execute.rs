//! Instruction execution for the M1047 family
//!
//! Dispatch is on the descriptor's [`Operation`]. Operand kinds decide where
//! values come from: a `Source` operand reads a register, an `Immediate`
//! operand uses the cell itself, an `Offset` is relative to the instruction.
//!
//! Every fallible access happens before the first write, so a faulting
//! instruction leaves the chip state untouched.

use crate::alu::{self, Outcome};
use crate::io;
use crate::state::{ChipState, Fault, InRegion, Region};
use mcu_disassembler::Decoded;
use mcu_spec::io::{resolve, IoTarget, MAPPED_BASE};
use mcu_spec::{Architecture, Flag, OperandKind, Operation, Pointer, Width};

/// Where execution continues after an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Fall through to the next instruction
    Next,
    /// Continue at an absolute address
    Jump(u32),
    /// Stop the chip after stepping past this instruction
    Break,
}

/// Execute one decoded instruction located at `state.ip`
pub fn execute(
    arch: &Architecture,
    width: Width,
    decoded: &Decoded<'_>,
    state: &mut ChipState,
) -> Result<Flow, Fault> {
    let mut exec = Exec {
        arch,
        width,
        bits: width.bits(),
        ip: state.ip,
        decoded,
        state,
    };
    exec.check_registers()?;
    exec.run()
}

struct Exec<'a, 'd> {
    arch: &'a Architecture,
    width: Width,
    bits: u32,
    ip: u32,
    decoded: &'a Decoded<'d>,
    state: &'a mut ChipState,
}

impl Exec<'_, '_> {
    fn run(&mut self) -> Result<Flow, Fault> {
        use Operation::*;

        let op = self.decoded.descriptor.operation;
        match op {
            Nop => {}

            // ========== Arithmetic ==========
            Add | AddWithCarry => {
                let a = self.reg(OperandKind::Destination)?;
                let b = self.src()?;
                let carry = op == AddWithCarry && self.flag(Flag::Carry);
                let out = alu::add(a, b, carry, self.bits);
                self.write_back(out)?;
            }
            Subtract | SubtractWithCarry | Compare => {
                let a = self.reg(OperandKind::Destination)?;
                let b = self.src()?;
                let borrow = op == SubtractWithCarry && self.flag(Flag::Carry);
                let out = alu::sub(a, b, borrow, self.bits);
                if op == Compare {
                    self.apply(&out)?;
                } else {
                    self.write_back(out)?;
                }
            }
            AddWord | SubtractWord => {
                let (low, high) = self.pair()?;
                let a = (self.reg_at(high)? << self.bits) | self.reg_at(low)?;
                let k = self.cell(OperandKind::Immediate)? as u64 & alu::mask(self.bits);
                let out = if op == AddWord {
                    alu::add(a, k, false, 2 * self.bits)
                } else {
                    alu::sub(a, k, false, 2 * self.bits)
                };
                let mask = alu::mask(self.bits);
                self.write_reg_at(low, out.value & mask)?;
                self.write_reg_at(high, (out.value >> self.bits) & mask)?;
                self.apply(&out)?;
            }
            Increment => {
                let a = self.reg(OperandKind::Destination)?;
                self.write_back(alu::add(a, 1, false, self.bits))?;
            }
            Decrement => {
                let a = self.reg(OperandKind::Destination)?;
                self.write_back(alu::sub(a, 1, false, self.bits))?;
            }
            Negate => {
                let a = self.reg(OperandKind::Destination)?;
                self.write_back(alu::negate(a, self.bits))?;
            }

            // ========== Logical ==========
            And | Or | Xor => {
                let a = self.reg(OperandKind::Destination)?;
                let b = self.src()?;
                let value = match op {
                    And => a & b,
                    Or => a | b,
                    _ => a ^ b,
                };
                self.write_back(alu::logic(value, self.bits))?;
            }
            Complement => {
                let a = self.reg(OperandKind::Destination)?;
                self.write_back(alu::complement(a, self.bits))?;
            }

            // ========== Shift ==========
            ShiftLeft | ShiftRight | ArithmeticShiftRight | RotateRight => {
                let a = self.reg(OperandKind::Destination)?;
                let out = match op {
                    ShiftLeft => alu::shift_left(a, self.bits),
                    ShiftRight => alu::shift_right(a, self.bits),
                    ArithmeticShiftRight => alu::arithmetic_shift_right(a, self.bits),
                    _ => alu::rotate_right(a, self.flag(Flag::Carry), self.bits),
                };
                self.write_back(out)?;
            }

            // ========== Data transfer ==========
            Move => {
                let value = self.src()?;
                self.write_reg(OperandKind::Destination, value)?;
            }
            Load => {
                let address = self.address()?;
                let value = self.state.memory.read(address).in_region(self.ip, Region::Ram)?;
                self.write_reg(OperandKind::Destination, value as u64)?;
            }
            Store => {
                let address = self.address()?;
                let value = self.reg(OperandKind::Source)?;
                self.state
                    .memory
                    .write(address, value as u32)
                    .in_region(self.ip, Region::Ram)?;
            }
            Push => {
                let value = self.reg(OperandKind::Source)?;
                self.push(value as u32)?;
            }
            Pop => {
                let value = self.peek()?;
                self.write_reg(OperandKind::Destination, value as u64)?;
                self.state.sp = self.wrap(self.state.sp as i64 + 1);
            }
            In => {
                let address = self.cell(OperandKind::IoAddress)?;
                let value = self.io_read(address)?;
                self.write_reg(OperandKind::Destination, value as u64)?;
            }
            Out => {
                let address = self.cell(OperandKind::IoAddress)?;
                let value = self.reg(OperandKind::Source)?;
                self.io_write(address, value as u32)?;
            }
            SetPin | ClearPin => {
                let pin = self.cell(OperandKind::Bit)? as usize;
                self.state
                    .io
                    .set_pin(pin, op == SetPin)
                    .in_region(self.ip, Region::Digital)?;
            }

            // ========== Bit ==========
            SetFlag | ClearFlag => {
                let bit = self.cell(OperandKind::FlagBit)? as usize;
                self.state
                    .status
                    .set(bit, op == SetFlag)
                    .in_region(self.ip, Region::Status)?;
            }
            BitStore => {
                let bit = self.register_bit()?;
                let value = self.reg(OperandKind::Destination)?;
                self.set_flag(Flag::Transfer, (value >> bit) & 1 != 0)?;
            }
            BitLoad => {
                let bit = self.register_bit()?;
                let value = self.reg(OperandKind::Destination)?;
                let value = if self.flag(Flag::Transfer) {
                    value | (1 << bit)
                } else {
                    value & !(1 << bit)
                };
                self.write_reg(OperandKind::Destination, value)?;
            }

            // ========== Control flow ==========
            BranchIfSet | BranchIfClear => {
                let bit = self.cell(OperandKind::FlagBit)? as usize;
                let set = self
                    .state
                    .status
                    .get(bit)
                    .in_region(self.ip, Region::Status)?;
                if set == (op == BranchIfSet) {
                    return Ok(Flow::Jump(self.relative()?));
                }
            }
            Jump => {
                let target = if self.has(OperandKind::Offset) {
                    self.relative()?
                } else {
                    self.cell(OperandKind::Address)?
                };
                return Ok(Flow::Jump(target));
            }
            Call => {
                let target = self.cell(OperandKind::Address)?;
                let ret = self.wrap(self.ip as i64 + self.decoded.size() as i64);
                self.push(ret)?;
                return Ok(Flow::Jump(target));
            }
            Return => {
                let target = self.peek()?;
                self.state.sp = self.wrap(self.state.sp as i64 + 1);
                return Ok(Flow::Jump(target));
            }
            Break => return Ok(Flow::Break),
        }

        Ok(Flow::Next)
    }

    // ========== Operands ==========

    fn has(&self, kind: OperandKind) -> bool {
        self.decoded.descriptor.operand_position(kind).is_some()
    }

    /// Raw operand cell; a table row missing the operand cannot execute
    fn cell(&self, kind: OperandKind) -> Result<u32, Fault> {
        self.decoded.operand(kind).ok_or(self.illegal())
    }

    fn illegal(&self) -> Fault {
        Fault::IllegalInstruction {
            ip: self.ip,
            opcode: self.decoded.descriptor.opcode as u32,
        }
    }

    /// Second ALU input: register `Rr` or immediate `K`
    fn src(&self) -> Result<u64, Fault> {
        if self.has(OperandKind::Source) {
            self.reg(OperandKind::Source)
        } else {
            Ok(self.cell(OperandKind::Immediate)? as u64 & alu::mask(self.bits))
        }
    }

    /// Every register operand must name an existing register
    fn check_registers(&self) -> Result<(), Fault> {
        let len = self.state.registers.len() as u64;
        for (&kind, &cell) in self
            .decoded
            .descriptor
            .operands
            .iter()
            .zip(&self.decoded.operands)
        {
            if kind.is_register() && cell as u64 >= len {
                return Err(Fault::bounds(self.ip, Region::Registers, cell as u64, len));
            }
            if kind == OperandKind::Pointer {
                self.pair()?;
            }
        }
        Ok(())
    }

    /// `(low, high)` registers of the pointer operand
    fn pair(&self) -> Result<(usize, usize), Fault> {
        let cell = self.cell(OperandKind::Pointer)?;
        let len = self.state.registers.len();
        Pointer::from_index(cell)
            .and_then(|p| p.registers(len))
            .ok_or(Fault::bounds(self.ip, Region::Registers, cell as u64, len as u64))
    }

    /// Bit index within a register
    fn register_bit(&self) -> Result<u32, Fault> {
        let bit = self.cell(OperandKind::Bit)?;
        if bit >= self.bits {
            return Err(Fault::bounds(
                self.ip,
                Region::Registers,
                bit as u64,
                self.bits as u64,
            ));
        }
        Ok(bit)
    }

    /// RAM address from a pointer pair or an absolute operand
    fn address(&self) -> Result<u64, Fault> {
        if self.has(OperandKind::Pointer) {
            let (low, high) = self.pair()?;
            Ok((self.reg_at(high)? << self.bits) | self.reg_at(low)?)
        } else {
            Ok(self.cell(OperandKind::Address)? as u64)
        }
    }

    /// Target of a relative jump, wrapped to the address width
    fn relative(&self) -> Result<u32, Fault> {
        let offset = self.decoded.offset().ok_or(self.illegal())?;
        Ok(self.wrap(self.ip as i64 + offset))
    }

    #[inline]
    fn wrap(&self, value: i64) -> u32 {
        self.width.wrap(value)
    }

    // ========== Registers ==========

    fn reg(&self, kind: OperandKind) -> Result<u64, Fault> {
        let index = self.cell(kind)? as usize;
        self.reg_at(index)
    }

    fn reg_at(&self, index: usize) -> Result<u64, Fault> {
        self.state
            .registers
            .get_raw(index)
            .map(u64::from)
            .in_region(self.ip, Region::Registers)
    }

    fn write_reg(&mut self, kind: OperandKind, value: u64) -> Result<(), Fault> {
        let index = self.cell(kind)? as usize;
        self.write_reg_at(index, value)
    }

    fn write_reg_at(&mut self, index: usize, value: u64) -> Result<(), Fault> {
        self.state
            .registers
            .set_raw(index, value as u32)
            .in_region(self.ip, Region::Registers)
    }

    /// Store an ALU result in `Rd` and update its flags
    fn write_back(&mut self, out: Outcome) -> Result<(), Fault> {
        self.write_reg(OperandKind::Destination, out.value)?;
        self.apply(&out)
    }

    // ========== Flags ==========

    fn flag(&self, flag: Flag) -> bool {
        let index = self.arch.flags().index(flag);
        self.state.status.get(index).unwrap_or(false)
    }

    fn set_flag(&mut self, flag: Flag, value: bool) -> Result<(), Fault> {
        let index = self.arch.flags().index(flag);
        self.state
            .status
            .set(index, value)
            .in_region(self.ip, Region::Status)
    }

    /// Write the flags this instruction declares
    fn apply(&mut self, out: &Outcome) -> Result<(), Fault> {
        for &flag in self.decoded.descriptor.flags {
            if let Some(value) = out.flag(flag) {
                self.set_flag(flag, value)?;
            }
        }
        Ok(())
    }

    // ========== Stack ==========

    /// SP -= 1; RAM[SP] = value
    fn push(&mut self, value: u32) -> Result<(), Fault> {
        let sp = self.wrap(self.state.sp as i64 - 1);
        self.state
            .memory
            .write(sp as u64, value)
            .in_region(self.ip, Region::Stack)?;
        self.state.sp = sp;
        Ok(())
    }

    /// RAM[SP]; the caller post-increments SP once its own writes are safe
    fn peek(&self) -> Result<u32, Fault> {
        self.state
            .memory
            .read(self.state.sp as u64)
            .in_region(self.ip, Region::Stack)
    }

    // ========== I/O ==========

    fn io_read(&self, address: u32) -> Result<u32, Fault> {
        let target = resolve(address);
        if target == IoTarget::StackPointer {
            return Ok(self.state.sp);
        }
        match self.state.io.read(target) {
            Some(result) => result.in_region(self.ip, io::region(target)),
            None => Err(self.unmapped(address)),
        }
    }

    fn io_write(&mut self, address: u32, value: u32) -> Result<(), Fault> {
        let target = resolve(address);
        if target == IoTarget::StackPointer {
            self.state.sp = value & self.width.mask();
            return Ok(());
        }
        match self.state.io.write(target, value) {
            Some(result) => result.in_region(self.ip, io::region(target)),
            None => Err(self.unmapped(address)),
        }
    }

    fn unmapped(&self, address: u32) -> Fault {
        let len = MAPPED_BASE as u64 + self.state.io.mapped().len() as u64;
        Fault::bounds(self.ip, Region::Io, address as u64, len)
    }
}
