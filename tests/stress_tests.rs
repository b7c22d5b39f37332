//! Stress tests: long-running programs and large configurations

use mcu_runtime::{Chip, ChipOptions, FaultPolicy, StopReason};
use mcu_spec::opcode::m1047;
use mcu_spec::{encode, Architecture, ChipConfig, Flag, IoChannels, Width};

fn assemble(arch: &Architecture, width: Width, source: &[(&str, &[i64])]) -> Vec<u32> {
    source
        .iter()
        .flat_map(|(mnemonic, operands)| encode(arch, width, mnemonic, operands).unwrap())
        .collect()
}

#[test]
fn test_nested_loops() {
    let arch = Architecture::m1047();
    let z = arch.flags().index(Flag::Zero) as i64;
    // 200 * 200 increments of Z (r6:r7)
    let code = assemble(
        &arch,
        Width::W8,
        &[
            ("LDI", &[0, 200]),
            ("LDI", &[1, 200]),
            ("ADIW", &[2, 1]),
            ("DEC", &[1]),
            ("BRBC", &[z, -5]),
            ("DEC", &[0]),
            ("BRBC", &[z, -13]),
            ("BREAK", &[]),
        ],
    );

    let (chip, summary) = mcu_runtime::run(ChipConfig::M1047, &code, 1_000_000).unwrap();

    assert_eq!(summary.reason, StopReason::Break);
    let count = (chip.register(7).unwrap() << 8) | chip.register(6).unwrap();
    assert_eq!(count, 40_000 % 65_536);
    // 1 + 200 * (1 + 200 * 3 + 2) + 1
    assert_eq!(summary.cycles, 120_602);
}

#[test]
fn test_full_rom_of_nops() {
    let config = ChipConfig {
        bits: 16,
        registers: 16,
        ram: 1024,
        rom: 4096,
        io: IoChannels::default(),
        speed: 1000,
    };
    let mut chip = Chip::new(config).unwrap();
    chip.load_program(0, &vec![m1047::NOP as u32; 4096]).unwrap();

    let summary = chip.run(10_000);

    // Running off the end of ROM faults
    assert!(matches!(summary.reason, StopReason::Fault(_)));
    assert_eq!(summary.cycles, 4097);
    assert_eq!(chip.cycles(), 4096);
    assert_eq!(chip.instruction_pointer(), 4096);
}

#[test]
fn test_skip_policy_through_garbage() {
    let options = ChipOptions {
        fault_policy: FaultPolicy::Skip,
    };
    let mut chip = Chip::with_options(Architecture::m1047(), ChipConfig::M1047, options).unwrap();
    let mut code = vec![0xF0; 60];
    code.push(m1047::BREAK as u32);
    chip.load_program(0, &code).unwrap();

    let mut faults = 0;
    loop {
        chip.clear_fault();
        match chip.run(100).reason {
            StopReason::Fault(_) => faults += 1,
            StopReason::Break => break,
            StopReason::CycleLimit => panic!("no progress"),
        }
    }

    assert_eq!(faults, 60);
    assert_eq!(chip.instruction_pointer(), 61);
}

#[test]
fn test_deep_stack() {
    let arch = Architecture::m1047();
    let z = arch.flags().index(Flag::Zero) as i64;
    // Push 200 values, then pop them all, summing into r2
    let code = assemble(
        &arch,
        Width::W8,
        &[
            ("LDI", &[0, 200]),
            ("PUSH", &[0]),
            ("DEC", &[0]),
            ("BRBC", &[z, -4]),
            ("LDI", &[0, 200]),
            ("POP", &[1]),
            ("ADD", &[2, 1]),
            ("DEC", &[0]),
            ("BRBC", &[z, -7]),
            ("BREAK", &[]),
        ],
    );
    let config = ChipConfig {
        rom: 0,
        ..ChipConfig::M1047
    };
    let mut chip = Chip::new(config).unwrap();
    chip.load_program(0, &code).unwrap();

    let summary = chip.run(10_000);

    assert_eq!(summary.reason, StopReason::Break);
    assert_eq!(chip.stack_pointer(), 0);
    // sum(1..=200) mod 256
    assert_eq!(chip.register(2).unwrap(), (200 * 201 / 2) % 256);
}
