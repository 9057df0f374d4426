/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use altair_8080::bus::{Headless, UnpacedClock};
use altair_8080::cpu::{Flags, Registers};
use altair_8080::opcode::Pair;
use altair_8080::{Intel8080, Memory};
use proptest::prelude::*;

type Cpu = Intel8080<Headless, UnpacedClock>;

fn cpu_with(program: &[u8], registers: Registers, flags: Flags) -> Cpu {
    let memory = Memory::with_image(0, program).unwrap();
    let mut cpu = Intel8080::new(memory, Headless::new(0), UnpacedClock::new());
    *cpu.registers_mut() = registers;
    cpu.set_flags(flags);
    cpu
}

fn run(cpu: &mut Cpu, instructions: usize) {
    for _ in 0..instructions {
        cpu.step().unwrap();
    }
}

fn flags_from(psw: u8) -> Flags {
    Flags::from_processor_status_word(psw)
}

proptest! {
    #[test]
    fn memory_operand_matches_register_operand(op in 0u8..8, a in any::<u8>(), operand in any::<u8>(), psw in any::<u8>()) {
        // <op> B
        let mut with_register = cpu_with(
            &[0x80 | (op << 3)],
            Registers { a, b: operand, ..Default::default() },
            flags_from(psw),
        );
        run(&mut with_register, 1);

        // <op> M, HL at 2000h
        let mut with_memory = cpu_with(
            &[0x86 | (op << 3)],
            Registers { a, h: 0x20, l: 0x00, ..Default::default() },
            flags_from(psw),
        );
        with_memory.memory_mut()[0x2000] = operand;
        run(&mut with_memory, 1);

        // <op>I operand
        let mut with_immediate = cpu_with(
            &[0xc6 | (op << 3), operand],
            Registers { a, ..Default::default() },
            flags_from(psw),
        );
        run(&mut with_immediate, 1);

        prop_assert_eq!(with_register.registers().a, with_memory.registers().a);
        prop_assert_eq!(with_register.flags(), with_memory.flags());
        prop_assert_eq!(with_register.registers().a, with_immediate.registers().a);
        prop_assert_eq!(with_register.flags(), with_immediate.flags());
    }

    #[test]
    fn push_then_pop_restores_a_pair(b in any::<u8>(), c in any::<u8>(), sp in 0x1000u16..0xff00) {
        // PUSH B ; POP D
        let mut cpu = cpu_with(&[0xc5, 0xd1], Registers { b, c, sp, ..Default::default() }, Flags::default());
        run(&mut cpu, 1);
        prop_assert_eq!(cpu.registers().sp, sp - 2);
        prop_assert_eq!(cpu.memory()[sp - 1], b);
        prop_assert_eq!(cpu.memory()[sp - 2], c);
        run(&mut cpu, 1);
        prop_assert_eq!(cpu.registers().sp, sp);
        prop_assert_eq!(cpu.registers().pair_val(Pair::D), u16::from_be_bytes([b, c]));
    }

    #[test]
    fn pushed_status_word_has_fixed_bits(a in any::<u8>(), psw in any::<u8>()) {
        // PUSH PSW ; POP B ; PUSH B ; POP PSW
        let mut cpu = cpu_with(
            &[0xf5, 0xc1, 0xc5, 0xf1],
            Registers { a, sp: 0x8000, ..Default::default() },
            flags_from(psw),
        );
        run(&mut cpu, 2);
        let pushed = cpu.registers().c;
        prop_assert_eq!(cpu.registers().b, a);
        prop_assert_eq!(pushed & 0b0010_1010, 0b0000_0010);
        prop_assert_eq!(pushed, (psw & 0b1101_0111) | 0b0000_0010);
        run(&mut cpu, 2);
        prop_assert_eq!(cpu.registers().a, a);
        prop_assert_eq!(*cpu.flags(), flags_from(psw));
    }

    #[test]
    fn pair_arithmetic_wraps(pair in 0u8..4, value in any::<u16>()) {
        // INX rp ; DCX rp ; DCX rp
        let base = pair << 4;
        let mut cpu = cpu_with(&[0x03 | base, 0x0b | base, 0x0b | base], Registers::default(), Flags::default());
        let selected = Pair::from_bits(pair);
        cpu.registers_mut().set_pair_val(selected, value);
        run(&mut cpu, 1);
        prop_assert_eq!(cpu.registers().pair_val(selected), value.wrapping_add(1));
        run(&mut cpu, 2);
        prop_assert_eq!(cpu.registers().pair_val(selected), value.wrapping_sub(1));
    }

    #[test]
    fn call_then_return_comes_back(target in 0x0100u16..0x7000, sp in 0x8000u16..0xffff) {
        // CALL target ; ... target: RET
        let [high, low] = target.to_be_bytes();
        let mut cpu = cpu_with(&[0xcd, low, high], Registers { sp, ..Default::default() }, Flags::default());
        cpu.memory_mut()[target] = 0xc9;
        run(&mut cpu, 1);
        prop_assert_eq!(cpu.registers().pc, target);
        prop_assert_eq!(cpu.registers().sp, sp - 2);
        run(&mut cpu, 1);
        prop_assert_eq!(cpu.registers().pc, 3);
        prop_assert_eq!(cpu.registers().sp, sp);
    }

    #[test]
    fn conditional_jump_follows_zero(zero in any::<bool>(), target in any::<u16>()) {
        // JNZ target
        let [high, low] = target.to_be_bytes();
        let flags = Flags { z: zero, ..Default::default() };
        let mut cpu = cpu_with(&[0xc2, low, high], Registers::default(), flags);
        run(&mut cpu, 1);
        prop_assert_eq!(cpu.registers().pc, if zero { 3 } else { target });
    }

    #[test]
    fn alu_flags_describe_the_result(op in 0u8..8, a in any::<u8>(), b in any::<u8>()) {
        let mut cpu = cpu_with(&[0x80 | (op << 3)], Registers { a, b, ..Default::default() }, Flags::default());
        run(&mut cpu, 1);
        // CMP keeps A; the flags describe A - B
        let result = if op == 7 { a.wrapping_sub(b) } else { cpu.registers().a };
        prop_assert_eq!(cpu.flags().z, result == 0);
        prop_assert_eq!(cpu.flags().s, result & 0x80 != 0);
        prop_assert_eq!(cpu.flags().p, result.count_ones() % 2 == 0);
    }
}
