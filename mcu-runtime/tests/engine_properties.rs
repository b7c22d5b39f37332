//! Property tests for the cycle engine

use mcu_runtime::{Chip, ChipOptions, Fault, StopReason};
use mcu_spec::opcode::m1047;
use mcu_spec::{
    encode, Architecture, ChipConfig, Flag, FlagSet, InstructionDescriptor, OperandKind,
    Operation,
};
use proptest::prelude::*;
use std::sync::Arc;

fn ram_chip() -> Chip {
    Chip::new(ChipConfig {
        rom: 0,
        ..ChipConfig::M1047
    })
    .unwrap()
}

proptest! {
    #[test]
    fn prop_illegal_opcode_changes_nothing(
        opcode in (m1047::BREAK as u32 + 1)..=0xFF,
        regs in proptest::collection::vec(0u32..256, 8),
        carry in any::<bool>(),
    ) {
        let mut chip = ram_chip();
        chip.load_program(0, &[opcode]).unwrap();
        for (i, &value) in regs.iter().enumerate() {
            chip.set_register(i, value as i64).unwrap();
        }
        chip.set_flag(Flag::Carry, carry);
        let before = chip.snapshot();

        let err = chip.cycle().unwrap_err();

        prop_assert_eq!(err.fault(), Some(&Fault::IllegalInstruction { ip: 0, opcode }));
        let after = chip.snapshot();
        prop_assert_eq!(after.registers, before.registers);
        prop_assert_eq!(after.status, before.status);
        prop_assert_eq!(after.ram, before.ram);
        prop_assert_eq!(after.ip, before.ip);
        prop_assert_eq!(after.cycles, before.cycles);
    }

    #[test]
    fn prop_add_wraps(a in 0u32..256, b in 0u32..256) {
        let mut chip = ram_chip();
        chip.load_program(0, &[m1047::ADD as u32, 0, 1]).unwrap();
        chip.set_register(0, a as i64).unwrap();
        chip.set_register(1, b as i64).unwrap();

        chip.cycle().unwrap();

        prop_assert_eq!(chip.register(0).unwrap(), (a + b) % 256);
        prop_assert_eq!(chip.flag(Flag::Carry), a + b > 255);
        prop_assert_eq!(chip.flag(Flag::Zero), (a + b) % 256 == 0);
    }

    #[test]
    fn prop_branch_lands_on_offset(offset in -64i64..=63, taken in any::<bool>()) {
        let mut chip = ram_chip();
        let z = chip.arch().flags().index(Flag::Zero) as i64;
        let cells = encode(chip.arch(), chip.width(), "BRBS", &[z, offset]).unwrap();
        chip.load_program(100, &cells).unwrap();
        chip.set_instruction_pointer(100);
        chip.set_flag(Flag::Zero, taken);

        chip.cycle().unwrap();

        let expected = if taken { 100 + offset } else { 100 + cells.len() as i64 };
        prop_assert_eq!(chip.instruction_pointer() as i64, expected);
    }

    #[test]
    fn prop_push_pop_round_trip(values in proptest::collection::vec(0u32..256, 1..8)) {
        let mut chip = ram_chip();
        let mut program = Vec::new();
        for i in 0..values.len() {
            program.extend(encode(chip.arch(), chip.width(), "PUSH", &[i as i64]).unwrap());
        }
        for i in (0..values.len()).rev() {
            program.extend(encode(chip.arch(), chip.width(), "POP", &[i as i64]).unwrap());
        }
        program.extend(encode(chip.arch(), chip.width(), "BREAK", &[]).unwrap());
        chip.load_program(0, &program).unwrap();
        for (i, &value) in values.iter().enumerate() {
            chip.set_register(i, value as i64).unwrap();
        }
        let before = chip.registers().clone();

        let summary = chip.run(100);

        prop_assert_eq!(summary.reason, StopReason::Break);
        prop_assert_eq!(chip.registers(), &before);
        prop_assert_eq!(chip.stack_pointer(), 0);
    }
}

#[test]
fn test_swapped_family_runs_on_same_engine() {
    use OperandKind::{Destination, Immediate, Source};

    // Different numbering, and ADD here only reports Zero and Carry
    let arch = Architecture::new(
        "tiny",
        FlagSet::M1047,
        vec![
            InstructionDescriptor::new("HALT", 0x00, Operation::Break, &[], &[], "Stop"),
            InstructionDescriptor::new(
                "SET",
                0x40,
                Operation::Move,
                &[Destination, Immediate],
                &[],
                "Rd = K",
            ),
            InstructionDescriptor::new(
                "ADD",
                0x41,
                Operation::Add,
                &[Destination, Source],
                &[Flag::Zero, Flag::Carry],
                "Rd = Rd + Rr",
            ),
        ],
    )
    .unwrap();
    let arch = Arc::new(arch);

    let mut chip = Chip::with_options(
        Arc::clone(&arch),
        ChipConfig {
            rom: 0,
            ..ChipConfig::M1047
        },
        ChipOptions::default(),
    )
    .unwrap();
    let source: [(&str, &[i64]); 4] = [
        ("SET", &[0, 0x70]),
        ("SET", &[1, 0x10]),
        ("ADD", &[0, 1]),
        ("HALT", &[]),
    ];
    let mut program = Vec::new();
    for (mnemonic, operands) in source {
        program.extend(encode(&arch, chip.width(), mnemonic, operands).unwrap());
    }
    chip.load_program(0, &program).unwrap();

    let summary = chip.run(10);

    assert_eq!(summary.reason, StopReason::Break);
    assert_eq!(chip.register(0).unwrap(), 0x80);
    // Sign and Overflow are not declared by this ADD
    assert!(!chip.flag(Flag::Sign));
    assert!(!chip.flag(Flag::Overflow));
    assert_eq!(chip.disassemble_at(6).unwrap(), "add r0, r1");
}
