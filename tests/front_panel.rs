/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::thread;
use std::time::{Duration, Instant};

use altair_8080::bus::{Pacing, StatusWord};
use altair_8080::{Altair, MachineConfig, Memory};

const TIMEOUT: Duration = Duration::from_secs(5);

fn powered_on_with(program: &[u8], switches: u16) -> Altair {
    let memory = Memory::with_image(0, program).unwrap();
    let config = MachineConfig { pacing: Pacing::Unpaced, switches, start_running: false };
    let mut altair = Altair::new(memory, config);
    altair.start().unwrap();
    assert!(altair.panel().wait_until_held(TIMEOUT), "core did not stall at power on");
    altair
}

fn powered_on(program: &[u8]) -> Altair {
    powered_on_with(program, 0)
}

#[test]
fn powers_on_stalled_at_the_first_fetch() {
    let altair = powered_on(&[0x00]);
    let lamps = altair.panel().lamps();
    assert_eq!(lamps.address, 0);
    assert_eq!(lamps.status, StatusWord::FETCH);
    assert!(lamps.wait);
    let core = altair.shutdown().unwrap();
    assert_eq!(core.instructions(), 0);
    assert_eq!(core.registers().pc, 0);
}

#[test]
fn toggle_in_and_run_a_program() {
    let altair = powered_on(&[]);
    let panel = altair.panel().clone();

    // MVI A,5 ; INR A ; HLT
    panel.set_switches(0x3e);
    assert!(panel.deposit());
    for byte in &[0x05, 0x3c, 0x76] {
        panel.set_switches(*byte);
        assert!(panel.deposit_next());
    }
    assert_eq!(panel.lamps().address, 3);

    panel.set_switches(0x0000);
    assert!(panel.examine());
    assert_eq!(panel.lamps().address, 0);
    assert_eq!(panel.lamps().data, 0x3e);

    panel.run();
    assert!(panel.wait_until_halted(TIMEOUT));
    let core = altair.shutdown().unwrap();
    assert_eq!(core.registers().a, 6);
    assert!(!core.flags().z);
    assert_eq!(&core.memory().as_slice()[..4], &[0x3e, 0x05, 0x3c, 0x76]);
}

#[test]
fn examine_shows_memory_at_the_switches() {
    let mut program = vec![0u8; 0x0101];
    program[0x0100] = 0xa5;
    let altair = powered_on(&program);
    let panel = altair.panel();
    panel.set_switches(0x0100);
    assert!(panel.examine());
    let lamps = panel.lamps();
    assert_eq!(lamps.address, 0x0100);
    assert_eq!(lamps.data, 0xa5);
    assert!(panel.examine_next());
    assert_eq!(panel.lamps().address, 0x0101);
}

#[test]
fn stop_lands_on_an_instruction_fetch() {
    // JMP 0
    let altair = powered_on(&[0xc3, 0x00, 0x00]);
    let panel = altair.panel();
    panel.run();
    thread::sleep(Duration::from_millis(20));
    assert!(!panel.is_held());
    panel.stop();
    assert!(panel.wait_until_held(TIMEOUT));
    let lamps = panel.lamps();
    assert_eq!(lamps.status, StatusWord::FETCH);
    assert_eq!(lamps.address, 0);
    assert!(lamps.wait);
}

#[test]
fn single_step_moves_one_machine_cycle() {
    // MVI A,5 ; NOP
    let altair = powered_on(&[0x3e, 0x05, 0x00]);
    let panel = altair.panel();

    assert!(panel.single_step());
    let lamps = panel.lamps();
    assert_eq!(lamps.status, StatusWord::MEM_READ);
    assert_eq!(lamps.address, 1);
    assert_eq!(lamps.data, 0x05);

    assert!(panel.single_step());
    let lamps = panel.lamps();
    assert_eq!(lamps.status, StatusWord::FETCH);
    assert_eq!(lamps.address, 2);

    let core = altair.shutdown().unwrap();
    assert_eq!(core.registers().a, 5);
}

#[test]
fn breakpoint_stalls_the_fetch() {
    // NOP ; NOP ; NOP ; JMP 0
    let altair = powered_on(&[0x00, 0x00, 0x00, 0xc3, 0x00, 0x00]);
    let panel = altair.panel();
    panel.set_breakpoint(0x0002);
    panel.run();
    assert!(panel.wait_until_held(TIMEOUT));
    assert_eq!(panel.lamps().address, 0x0002);
    assert_eq!(panel.lamps().status, StatusWord::FETCH);

    panel.run();
    assert!(panel.wait_until_held(TIMEOUT));
    assert_eq!(panel.lamps().address, 0x0002);
}

#[test]
fn sense_switches_answer_input() {
    // IN 0FFh ; HLT
    let altair = powered_on_with(&[0xdb, 0xff, 0x76], 0xa500);
    altair.panel().run();
    assert!(altair.panel().wait_until_halted(TIMEOUT));
    let core = altair.shutdown().unwrap();
    assert_eq!(core.registers().a, 0xa5);
}

#[test]
fn run_resumes_after_halt() {
    // HLT ; MVI A,9 ; HLT
    let altair = powered_on(&[0x76, 0x3e, 0x09, 0x76]);
    let panel = altair.panel();
    panel.run();
    assert!(panel.wait_until_halted(TIMEOUT));
    assert_eq!(panel.lamps().status, StatusWord::HALT_ACK);
    panel.run();
    assert!(panel.wait_until_halted(TIMEOUT));
    let core = altair.shutdown().unwrap();
    assert_eq!(core.registers().a, 9);
    assert_eq!(core.registers().pc, 4);
}

#[test]
fn reset_restarts_at_zero_keeping_registers() {
    // MVI A,7 ; HLT
    let mut altair = powered_on(&[0x3e, 0x07, 0x76]);
    altair.panel().run();
    assert!(altair.panel().wait_until_halted(TIMEOUT));

    altair.reset().unwrap();
    assert!(altair.panel().wait_until_held(TIMEOUT));
    assert!(!altair.panel().is_halted());
    let lamps = altair.panel().lamps();
    assert_eq!(lamps.address, 0);
    assert_eq!(lamps.status, StatusWord::FETCH);

    let core = altair.shutdown().unwrap();
    assert_eq!(core.registers().a, 7);
    assert_eq!(core.registers().pc, 0);
}

#[test]
fn stalled_core_waits_until_cancelled() {
    let altair = powered_on(&[0x00]);
    thread::sleep(Duration::from_millis(50));
    assert!(altair.panel().lamps().wait);
    assert!(altair.panel().is_held());

    let before = Instant::now();
    let core = altair.shutdown().unwrap();
    assert!(before.elapsed() < TIMEOUT);
    assert_eq!(core.instructions(), 0);
    assert_eq!(core.registers().pc, 0);
    assert!(!core.lines().wait());
}
