/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

mod opcodes;
pub use self::opcodes::Condition;
pub use self::opcodes::OpCode;
pub use self::opcodes::Pair;
pub use self::opcodes::Register;

use std::sync::OnceLock;

use self::opcodes::OpCode::*;

type DecodeTable = [Option<OpCode>; 256];

static DECODE_TABLE: OnceLock<DecodeTable> = OnceLock::new();

/// Looks up the instruction an opcode byte selects.
///
/// The table is built once from the bit fields of every possible byte. `None` means the
/// byte matched no pattern, which the core treats as a fatal decode fault.
pub fn decode(opcode: u8) -> Option<OpCode> {
    DECODE_TABLE.get_or_init(build_table)[opcode as usize]
}

fn build_table() -> DecodeTable {
    let mut table = [None; 256];
    for (opcode, entry) in table.iter_mut().enumerate() {
        *entry = decode_fields(opcode as u8);
    }
    table
}

/// Bits 7-6 pick the quadrant, bits 5-3 the destination or condition, bits 2-0 the source
/// or sub operation and bits 5-4 the register pair.
fn decode_fields(opcode: u8) -> Option<OpCode> {
    let ddd = (opcode >> 3) & 0b111;
    let sss = opcode & 0b111;
    let pair = Pair::from_bits(opcode >> 4);
    let odd_row = opcode & 0b1000 != 0;

    match opcode >> 6 {
        0b00 => Some(decode_low_quadrant(ddd, sss, pair, odd_row)),
        0b01 => Some(match (Register::from_bits(ddd), Register::from_bits(sss)) {
            // MOV M,M is the one encoding taken by HLT
            (None, None) => Hlt,
            (Some(dst), None) => MovFromM(dst),
            (None, Some(src)) => MovToM(src),
            (Some(dst), Some(src)) => Mov(dst, src),
        }),
        0b10 => Some(decode_accumulator_op(ddd, Register::from_bits(sss))),
        0b11 => Some(decode_high_quadrant(ddd, sss, pair, odd_row)),
        _ => None,
    }
}

fn decode_low_quadrant(ddd: u8, sss: u8, pair: Pair, odd_row: bool) -> OpCode {
    let reg = Register::from_bits(ddd);
    match sss {
        // 0x08, 0x10 ... 0x38 all alias NOP
        0 => Nop,
        1 if odd_row => Dad(pair),
        1 => Lxi(pair),
        2 => match (pair, odd_row) {
            (Pair::H, false) => Shld,
            (Pair::SP, false) => Sta,
            (_, false) => Stax(pair),
            (Pair::H, true) => Lhld,
            (Pair::SP, true) => Lda,
            (_, true) => Ldax(pair),
        },
        3 if odd_row => Dcx(pair),
        3 => Inx(pair),
        4 => reg.map_or(InrM, Inr),
        5 => reg.map_or(DcrM, Dcr),
        6 => reg.map_or(MviM, Mvi),
        _ => match ddd {
            0 => Rlc,
            1 => Rrc,
            2 => Ral,
            3 => Rar,
            4 => Daa,
            5 => Cma,
            6 => Stc,
            _ => Cmc,
        },
    }
}

fn decode_accumulator_op(ddd: u8, src: Option<Register>) -> OpCode {
    match (ddd, src) {
        (0, Some(reg)) => Add(reg),
        (0, None) => AddM,
        (1, Some(reg)) => Adc(reg),
        (1, None) => AdcM,
        (2, Some(reg)) => Sub(reg),
        (2, None) => SubM,
        (3, Some(reg)) => Sbb(reg),
        (3, None) => SbbM,
        (4, Some(reg)) => Ana(reg),
        (4, None) => AnaM,
        (5, Some(reg)) => Xra(reg),
        (5, None) => XraM,
        (6, Some(reg)) => Ora(reg),
        (6, None) => OraM,
        (_, Some(reg)) => Cmp(reg),
        (_, None) => CmpM,
    }
}

fn decode_high_quadrant(ddd: u8, sss: u8, pair: Pair, odd_row: bool) -> OpCode {
    let condition = Condition::from_bits(ddd);
    match sss {
        0 => Rcc(condition),
        1 => match (pair, odd_row) {
            (Pair::SP, false) => PopPsw,
            (_, false) => Pop(pair),
            // 0xd9 aliases RET
            (Pair::B, true) | (Pair::D, true) => Ret,
            (Pair::H, true) => Pchl,
            (Pair::SP, true) => Sphl,
        },
        2 => Jcc(condition),
        3 => match ddd {
            // 0xcb aliases JMP
            0 | 1 => Jmp,
            2 => Out,
            3 => In,
            4 => Xthl,
            5 => Xchg,
            6 => Di,
            _ => Ei,
        },
        4 => Ccc(condition),
        5 => match (pair, odd_row) {
            (Pair::SP, false) => PushPsw,
            (_, false) => Push(pair),
            // 0xdd, 0xed and 0xfd alias CALL
            (_, true) => Call,
        },
        6 => match ddd {
            0 => Adi,
            1 => Aci,
            2 => Sui,
            3 => Sbi,
            4 => Ani,
            5 => Xri,
            6 => Ori,
            _ => Cpi,
        },
        _ => Rst(ddd),
    }
}
