/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use self::OpCode::*;
use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;

use crate::cpu::Flags;

/// An 8 bit register, in the order of the 3 bit register field. Field value 6 is the
/// memory operand `M` and has no `Register`.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Register {
    B,
    C,
    D,
    E,
    H,
    L,
    A,
}

impl Register {

    pub fn from_bits(field: u8) -> Option<Register> {
        match field & 0b111 {
            0 => Some(Register::B),
            1 => Some(Register::C),
            2 => Some(Register::D),
            3 => Some(Register::E),
            4 => Some(Register::H),
            5 => Some(Register::L),
            7 => Some(Register::A),
            _ => None,
        }
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{:?}", self)
    }
}

/// A register pair selected by bits 5-4. `SP` reads as `PSW` for `PUSH`/`POP`, which have
/// their own variants.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Pair {
    B,
    D,
    H,
    SP,
}

impl Pair {

    pub fn from_bits(field: u8) -> Pair {
        match field & 0b11 {
            0 => Pair::B,
            1 => Pair::D,
            2 => Pair::H,
            _ => Pair::SP,
        }
    }
}

impl Display for Pair {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{:?}", self)
    }
}

/// Branch condition held in bits 5-3 of conditional jumps, calls and returns.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Condition {
    NotZero,
    Zero,
    NoCarry,
    Carry,
    ParityOdd,
    ParityEven,
    Plus,
    Minus,
}

impl Condition {

    pub fn from_bits(field: u8) -> Condition {
        match field & 0b111 {
            0 => Condition::NotZero,
            1 => Condition::Zero,
            2 => Condition::NoCarry,
            3 => Condition::Carry,
            4 => Condition::ParityOdd,
            5 => Condition::ParityEven,
            6 => Condition::Plus,
            _ => Condition::Minus,
        }
    }

    /// The field pairs up as (flag clear, flag set) for Zero, Carry, Parity and Sign.
    pub fn is_met(&self, flags: &Flags) -> bool {
        let field = *self as u8;
        let flag = match field / 2 {
            0 => flags.z,
            1 => flags.cy,
            2 => flags.p,
            _ => flags.s,
        };
        if field % 2 == 0 { !flag } else { flag }
    }

    fn suffix(&self) -> &'static str {
        match *self {
            Condition::NotZero => "NZ",
            Condition::Zero => "Z",
            Condition::NoCarry => "NC",
            Condition::Carry => "C",
            Condition::ParityOdd => "PO",
            Condition::ParityEven => "PE",
            Condition::Plus => "P",
            Condition::Minus => "M",
        }
    }
}

/// A decoded instruction: the execution unit plus its pre-decoded operand fields.
///
/// Immediate data is not part of the opcode: it is read by the instruction's own memory
/// read cycles once it executes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OpCode {
    Nop,
    Lxi(Pair),
    Stax(Pair),
    Shld,
    Sta,
    Inx(Pair),
    Inr(Register),
    InrM,
    Dcr(Register),
    DcrM,
    Mvi(Register),
    MviM,
    Rlc,
    Rrc,
    Ral,
    Rar,
    Daa,
    Cma,
    Stc,
    Cmc,
    Dad(Pair),
    Ldax(Pair),
    Lhld,
    Lda,
    Dcx(Pair),

    Mov(Register, Register),
    MovToM(Register),
    MovFromM(Register),
    Hlt,

    Add(Register),
    AddM,
    Adc(Register),
    AdcM,
    Sub(Register),
    SubM,
    Sbb(Register),
    SbbM,
    Ana(Register),
    AnaM,
    Xra(Register),
    XraM,
    Ora(Register),
    OraM,
    Cmp(Register),
    CmpM,

    Rcc(Condition),
    Ret,
    Pop(Pair),
    PopPsw,
    Jcc(Condition),
    Jmp,
    Out,
    In,
    Xthl,
    Xchg,
    Di,
    Ei,
    Ccc(Condition),
    Call,
    Push(Pair),
    PushPsw,
    Adi,
    Aci,
    Sui,
    Sbi,
    Ani,
    Xri,
    Ori,
    Cpi,
    Rst(u8),
    Pchl,
    Sphl,
}

impl OpCode {

    /// Number of bytes the instruction occupies, opcode included.
    pub fn size(&self) -> u16 {
        match *self {
            Lxi(_)
            | Shld
            | Lhld
            | Sta
            | Lda
            | Jcc(_)
            | Jmp
            | Ccc(_)
            | Call => 3,
            Mvi(_)
            | MviM
            | Adi
            | Aci
            | Sui
            | Sbi
            | Ani
            | Xri
            | Ori
            | Cpi
            | Out
            | In => 2,
            _ => 1,
        }
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match *self {
            Nop => write!(f, "NOP"),
            Lxi(pair) => write!(f, "LXI {},d16", pair),
            Stax(pair) => write!(f, "STAX {}", pair),
            Shld => write!(f, "SHLD a16"),
            Sta => write!(f, "STA a16"),
            Inx(pair) => write!(f, "INX {}", pair),
            Inr(reg) => write!(f, "INR {}", reg),
            InrM => write!(f, "INR M"),
            Dcr(reg) => write!(f, "DCR {}", reg),
            DcrM => write!(f, "DCR M"),
            Mvi(reg) => write!(f, "MVI {},d8", reg),
            MviM => write!(f, "MVI M,d8"),
            Rlc => write!(f, "RLC"),
            Rrc => write!(f, "RRC"),
            Ral => write!(f, "RAL"),
            Rar => write!(f, "RAR"),
            Daa => write!(f, "DAA"),
            Cma => write!(f, "CMA"),
            Stc => write!(f, "STC"),
            Cmc => write!(f, "CMC"),
            Dad(pair) => write!(f, "DAD {}", pair),
            Ldax(pair) => write!(f, "LDAX {}", pair),
            Lhld => write!(f, "LHLD a16"),
            Lda => write!(f, "LDA a16"),
            Dcx(pair) => write!(f, "DCX {}", pair),

            Mov(dst, src) => write!(f, "MOV {},{}", dst, src),
            MovToM(reg) => write!(f, "MOV M,{}", reg),
            MovFromM(reg) => write!(f, "MOV {},M", reg),
            Hlt => write!(f, "HLT"),

            Add(reg) => write!(f, "ADD {}", reg),
            AddM => write!(f, "ADD M"),
            Adc(reg) => write!(f, "ADC {}", reg),
            AdcM => write!(f, "ADC M"),
            Sub(reg) => write!(f, "SUB {}", reg),
            SubM => write!(f, "SUB M"),
            Sbb(reg) => write!(f, "SBB {}", reg),
            SbbM => write!(f, "SBB M"),
            Ana(reg) => write!(f, "ANA {}", reg),
            AnaM => write!(f, "ANA M"),
            Xra(reg) => write!(f, "XRA {}", reg),
            XraM => write!(f, "XRA M"),
            Ora(reg) => write!(f, "ORA {}", reg),
            OraM => write!(f, "ORA M"),
            Cmp(reg) => write!(f, "CMP {}", reg),
            CmpM => write!(f, "CMP M"),

            Rcc(cond) => write!(f, "R{}", cond.suffix()),
            Ret => write!(f, "RET"),
            Pop(pair) => write!(f, "POP {}", pair),
            PopPsw => write!(f, "POP PSW"),
            Jcc(cond) => write!(f, "J{} a16", cond.suffix()),
            Jmp => write!(f, "JMP a16"),
            Out => write!(f, "OUT d8"),
            In => write!(f, "IN d8"),
            Xthl => write!(f, "XTHL"),
            Xchg => write!(f, "XCHG"),
            Di => write!(f, "DI"),
            Ei => write!(f, "EI"),
            Ccc(cond) => write!(f, "C{} a16", cond.suffix()),
            Call => write!(f, "CALL a16"),
            Push(pair) => write!(f, "PUSH {}", pair),
            PushPsw => write!(f, "PUSH PSW"),
            Adi => write!(f, "ADI d8"),
            Aci => write!(f, "ACI d8"),
            Sui => write!(f, "SUI d8"),
            Sbi => write!(f, "SBI d8"),
            Ani => write!(f, "ANI d8"),
            Xri => write!(f, "XRI d8"),
            Ori => write!(f, "ORI d8"),
            Cpi => write!(f, "CPI d8"),
            Rst(vector) => write!(f, "RST {}", vector),
            Pchl => write!(f, "PCHL"),
            Sphl => write!(f, "SPHL"),
        }
    }
}
