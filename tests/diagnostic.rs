/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use altair_8080::bus::{Headless, UnpacedClock};
use altair_8080::opcode::Pair;
use altair_8080::{Intel8080, Memory, Step};

/// Address of the CP/M BDOS entry the diagnostic prints through.
const BDOS: u16 = 0x0005;
const PRINT_STRING: u8 = 9;

fn place(memory: &mut Memory, address: u16, bytes: &[u8]) {
    memory.load(address, bytes).unwrap();
}

/// A small self-checking program in the style of the classic CPU diagnostics: it runs a
/// handful of instruction groups and prints "CPU OK" or "CPU FAIL" through BDOS call 9.
fn diagnostic() -> Memory {
    let mut memory = Memory::new();
    // JMP 0100h
    place(&mut memory, 0x0000, &[0xc3, 0x00, 0x01]);
    // BDOS: RET
    place(&mut memory, BDOS, &[0xc9]);

    place(&mut memory, 0x0100, &[
        0x31, 0x00, 0x02,       // LXI SP,0200h
        0x3e, 0x05,             // MVI A,5
        0x06, 0x03,             // MVI B,3
        0x80,                   // ADD B
        0xfe, 0x08,             // CPI 8
        0xc2, 0x30, 0x01,       // JNZ fail
        0x21, 0x00, 0x03,       // LXI H,0300h
        0x77,                   // MOV M,A
        0x34,                   // INR M
        0x7e,                   // MOV A,M
        0xc6, 0x01,             // ADI 1
        0x27,                   // DAA
        0xfe, 0x10,             // CPI 10h
        0xc2, 0x30, 0x01,       // JNZ fail
        0xcd, 0x40, 0x01,       // CALL load42
        0xfe, 0x42,             // CPI 42h
        0xc2, 0x30, 0x01,       // JNZ fail
        0xcd, 0x80, 0x01,       // CALL pairs
        0x11, 0x50, 0x01,       // LXI D,ok
        0x0e, 0x09,             // MVI C,9
        0xcd, 0x05, 0x00,       // CALL BDOS
        0x76,                   // HLT
    ]);
    // fail
    place(&mut memory, 0x0130, &[
        0x11, 0x58, 0x01,       // LXI D,ko
        0x0e, 0x09,             // MVI C,9
        0xcd, 0x05, 0x00,       // CALL BDOS
        0x76,                   // HLT
    ]);
    // load42
    place(&mut memory, 0x0140, &[
        0x3e, 0x42,             // MVI A,42h
        0xc9,                   // RET
    ]);
    place(&mut memory, 0x0150, b"CPU OK$");
    place(&mut memory, 0x0158, b"CPU FAIL$");
    // pairs
    place(&mut memory, 0x0180, &[
        0x21, 0xff, 0xff,       // LXI H,0FFFFh
        0x01, 0x02, 0x00,       // LXI B,2
        0x09,                   // DAD B
        0xd2, 0x30, 0x01,       // JNC fail
        0x7d,                   // MOV A,L
        0xfe, 0x01,             // CPI 1
        0xc2, 0x30, 0x01,       // JNZ fail
        0xc5,                   // PUSH B
        0xe3,                   // XTHL
        0xd1,                   // POP D
        0x7b,                   // MOV A,E
        0x85,                   // ADD L
        0xfe, 0x03,             // CPI 3
        0xc2, 0x30, 0x01,       // JNZ fail
        0xc9,                   // RET
    ]);
    memory
}

/// Runs until HLT, collecting everything printed through the BDOS trap.
fn run_with_bdos(memory: Memory) -> (Intel8080<Headless, UnpacedClock>, String) {
    let mut cpu = Intel8080::new(memory, Headless::new(0), UnpacedClock::new());
    let mut output = String::new();
    for _ in 0..10_000 {
        if cpu.step().unwrap() == Step::Halted {
            return (cpu, output);
        }
        if cpu.registers().pc == BDOS && cpu.registers().c == PRINT_STRING {
            let start = cpu.registers().pair_val(Pair::D) as usize;
            output.extend(
                cpu.memory().as_slice()[start..].iter()
                    .take_while(|byte| **byte != b'$')
                    .map(|byte| char::from(*byte))
            );
        }
    }
    panic!("no HLT after 10000 instructions, printed {:?}", output);
}

#[test]
fn diagnostic_reports_ok() {
    let (cpu, output) = run_with_bdos(diagnostic());
    assert_eq!(output, "CPU OK");
    assert_eq!(cpu.registers().pc, 0x012f);
    assert_eq!(cpu.registers().sp, 0x0200);
}

#[test]
fn diagnostic_catches_a_broken_program() {
    let mut memory = diagnostic();
    // CPI 8 becomes CPI 9
    memory[0x0109] = 0x09;
    let (_, output) = run_with_bdos(memory);
    assert_eq!(output, "CPU FAIL");
}

#[test]
fn increment_after_load() {
    let memory = Memory::with_image(0, &[0x3e, 0x05, 0x3c]).unwrap();
    let mut cpu = Intel8080::new(memory, Headless::new(0), UnpacedClock::new());
    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.registers().a, 0x06);
    assert!(!cpu.flags().z);
    assert_eq!(cpu.registers().pc, 3);
}
