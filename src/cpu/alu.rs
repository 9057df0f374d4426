/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Flag arithmetic of the 8080 ALU, per instruction family.
//!
//! Every function takes the incoming flags and returns the result byte with the updated
//! flags, so register, memory and immediate operand forms share one implementation.

use super::flags::Flags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: Flags,
}

/// Accumulator operations selected by bits 5-3 of `10xxxsss` and `11xxx110`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
}

impl AluOp {

    /// Applies the operation to the accumulator `a` and `operand`. `Cmp` leaves the
    /// accumulator value unchanged.
    pub fn apply(self, a: u8, operand: u8, flags: Flags) -> AluResult {
        match self {
            AluOp::Add => add(a, operand, false, flags),
            AluOp::Adc => add(a, operand, flags.cy, flags),
            AluOp::Sub => sub(a, operand, false, flags),
            AluOp::Sbb => sub(a, operand, flags.cy, flags),
            AluOp::Ana => and(a, operand, flags),
            AluOp::Xra => xor(a, operand, flags),
            AluOp::Ora => or(a, operand, flags),
            AluOp::Cmp => AluResult { value: a, ..sub(a, operand, false, flags) },
        }
    }
}

pub fn add(a: u8, b: u8, carry: bool, mut flags: Flags) -> AluResult {
    let cin = carry as u16;
    let sum = a as u16 + b as u16 + cin;
    let value = sum as u8;
    flags.update_zsp(value);
    flags.cy = sum > 0xff;
    flags.ac = (a & 0x0f) as u16 + (b & 0x0f) as u16 + cin > 0x0f;
    AluResult { value, flags }
}

/// Borrow out of bit 4 is read through the two's complement identity
/// `a - b - borrow == a + !b + (1 - borrow)`, whatever the operand source.
pub fn sub(a: u8, b: u8, borrow: bool, mut flags: Flags) -> AluResult {
    let bin = borrow as i16;
    let difference = a as i16 - b as i16 - bin;
    let value = difference as u8;
    flags.update_zsp(value);
    flags.cy = difference < 0;
    flags.ac = (a & 0x0f) as i16 + (!b & 0x0f) as i16 + (1 - bin) > 0x0f;
    AluResult { value, flags }
}

/// Aux carry is the OR of bit 3 of both operands, as the hardware does it.
pub fn and(a: u8, b: u8, mut flags: Flags) -> AluResult {
    let value = a & b;
    flags.update_zsp(value);
    flags.cy = false;
    flags.ac = ((a | b) & 0x08) != 0;
    AluResult { value, flags }
}

pub fn xor(a: u8, b: u8, mut flags: Flags) -> AluResult {
    let value = a ^ b;
    flags.update_zsp(value);
    flags.cy = false;
    flags.ac = false;
    AluResult { value, flags }
}

pub fn or(a: u8, b: u8, mut flags: Flags) -> AluResult {
    let value = a | b;
    flags.update_zsp(value);
    flags.cy = false;
    flags.ac = false;
    AluResult { value, flags }
}

/// INR: carry untouched.
pub fn increment(value: u8, mut flags: Flags) -> AluResult {
    let result = value.wrapping_add(1);
    flags.update_zsp(result);
    flags.ac = (result & 0x0f) == 0;
    AluResult { value: result, flags }
}

/// DCR: carry untouched.
pub fn decrement(value: u8, mut flags: Flags) -> AluResult {
    let result = value.wrapping_sub(1);
    flags.update_zsp(result);
    flags.ac = (result & 0x0f) != 0x0f;
    AluResult { value: result, flags }
}

/// Two-nibble BCD correction. Carry is only ever set here, never cleared.
pub fn decimal_adjust(a: u8, mut flags: Flags) -> AluResult {
    let mut value = a as u16;
    let low = a & 0x0f;
    if low > 9 || flags.ac {
        flags.ac = low + 6 > 0x0f;
        value += 0x06;
    } else {
        flags.ac = false;
    }
    if (value >> 4) > 9 || flags.cy {
        value += 0x60;
    }
    flags.cy = flags.cy || value > 0xff;
    let value = value as u8;
    flags.update_zsp(value);
    AluResult { value, flags }
}
