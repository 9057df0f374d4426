/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

const SIGN: u8 = 1 << 7;
const ZERO: u8 = 1 << 6;
const AUX_CARRY: u8 = 1 << 4;
const PARITY: u8 = 1 << 2;
const ALWAYS_SET: u8 = 1 << 1;
const CARRY: u8 = 1;

/// Condition flags. Packed into the program status word they sit beside three fixed
/// bits: bit 1 always set, bits 3 and 5 always clear.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
   pub z: bool,
   pub s: bool,
   pub p: bool,
   pub cy: bool,
   pub ac: bool,
}

impl Flags {

    /// Reserved bits of `psw` are ignored.
    pub fn from_processor_status_word(psw: u8) -> Flags {
        Flags {
            z: (psw & ZERO) != 0,
            s: (psw & SIGN) != 0,
            p: (psw & PARITY) != 0,
            cy: (psw & CARRY) != 0,
            ac: (psw & AUX_CARRY) != 0,
        }
    }

    pub fn to_processor_status_word(&self) -> u8 {
        let mut psw = ALWAYS_SET;
        if self.s { psw |= SIGN }
        if self.z { psw |= ZERO }
        if self.ac { psw |= AUX_CARRY }
        if self.p { psw |= PARITY }
        if self.cy { psw |= CARRY }
        psw
    }

    /// Refreshes Zero, Sign and Parity from a result byte.
    pub fn update_zsp(&mut self, result: u8) {
        self.update(result, Refresh::ZSP);
    }

    /// Refreshes the selected subset of Zero, Sign and Parity from a result byte.
    pub fn update(&mut self, result: u8, which: Refresh) {
        if which.zero {
            self.z = result == 0;
        }
        if which.sign {
            self.s = (result & 0x80) != 0;
        }
        if which.parity {
            self.p = parity(result);
        }
    }
}

/// Selects which of the result-derived flags `Flags::update` rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refresh {
    pub zero: bool,
    pub sign: bool,
    pub parity: bool,
}

impl Refresh {
    pub const ZSP: Refresh = Refresh { zero: true, sign: true, parity: true };
}

/// True when `value` has an even number of set bits.
pub fn parity(mut value: u8) -> bool {
    value ^= value >> 4;
    value ^= value >> 2;
    value ^= value >> 1;
    (value & 1) == 0
}
