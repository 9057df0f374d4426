/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::opcode::{Pair, Register};

/// The programmer visible register file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {

    pub fn apply_mov(&mut self, dst: Register, src: Register) {
        let reg_value = self.reg_val(src);
        self.set_reg_val(dst, reg_value);
    }

    pub fn reg_val(&self, reg: Register) -> u8 {
        match reg {
            Register::A => self.a,
            Register::B => self.b,
            Register::C => self.c,
            Register::D => self.d,
            Register::E => self.e,
            Register::H => self.h,
            Register::L => self.l,
        }
    }

    pub fn set_reg_val(&mut self, reg: Register, value: u8) {
        match reg {
            Register::A => self.a = value,
            Register::B => self.b = value,
            Register::C => self.c = value,
            Register::D => self.d = value,
            Register::E => self.e = value,
            Register::H => self.h = value,
            Register::L => self.l = value,
        }
    }

    pub fn pair_val(&self, pair: Pair) -> u16 {
        match pair {
            Pair::B => u16::from_be_bytes([self.b, self.c]),
            Pair::D => u16::from_be_bytes([self.d, self.e]),
            Pair::H => u16::from_be_bytes([self.h, self.l]),
            Pair::SP => self.sp,
        }
    }

    pub fn set_pair_val(&mut self, pair: Pair, value: u16) {
        let [high, low] = value.to_be_bytes();
        match pair {
            Pair::B => {
                self.b = high;
                self.c = low;
            }
            Pair::D => {
                self.d = high;
                self.e = low;
            }
            Pair::H => {
                self.h = high;
                self.l = low;
            }
            Pair::SP => self.sp = value,
        }
    }

    /// Address held in HL, the memory operand `M`.
    pub fn hl(&self) -> u16 {
        self.pair_val(Pair::H)
    }
}

#[cfg(test)]
mod tests {
    use super::Registers;
    use crate::opcode::{Pair, Register};

    #[test]
    fn pairs_are_high_byte_first() {
        let mut regs = Registers::default();
        regs.set_pair_val(Pair::B, 0x1234);
        assert_eq!(regs.b, 0x12);
        assert_eq!(regs.c, 0x34);
        assert_eq!(regs.pair_val(Pair::B), 0x1234);
    }

    #[test]
    fn sp_is_a_whole_word() {
        let mut regs = Registers::default();
        regs.set_pair_val(Pair::SP, 0xfeed);
        assert_eq!(regs.sp, 0xfeed);
        assert_eq!(regs.pair_val(Pair::SP), 0xfeed);
    }

    #[test]
    fn mov_copies_between_registers() {
        let mut regs = Registers { e: 0x99, ..Default::default() };
        regs.apply_mov(Register::A, Register::E);
        assert_eq!(regs.a, 0x99);
    }
}
