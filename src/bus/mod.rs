/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The system bus seen from outside the core.
//!
//! Every memory and I/O access is a machine cycle: the core publishes an address and a
//! status word, lets the [`BusController`] react to the SYNC pulse, then strobes data
//! while honouring READY. The published signals live in [`BusLines`] so a front panel on
//! another thread can light its lamps from them.

mod clock;
pub(crate) mod cycle;
mod headless;

pub use self::clock::{Clock, Pacing, RealTimeClock, UnpacedClock, STATE_DURATION};
pub use self::headless::Headless;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};

use crate::memory::Memory;

/// Port address that reads the sense switches.
pub const SENSE_SWITCH_PORT: u16 = 0xffff;

/// The status byte published during T1 of every machine cycle.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord(pub u8);

impl StatusWord {
    pub const INTA: u8 = 0x01;
    /// Active low: clear during write cycles.
    pub const WO: u8 = 0x02;
    pub const STACK: u8 = 0x04;
    pub const HLTA: u8 = 0x08;
    pub const OUT: u8 = 0x10;
    pub const M1: u8 = 0x20;
    pub const INP: u8 = 0x40;
    pub const MEMR: u8 = 0x80;

    pub const FETCH: StatusWord = StatusWord(0xa2);
    pub const MEM_READ: StatusWord = StatusWord(0x82);
    pub const MEM_WRITE: StatusWord = StatusWord(0x00);
    pub const STACK_READ: StatusWord = StatusWord(0x86);
    pub const STACK_WRITE: StatusWord = StatusWord(0x04);
    pub const INPUT_READ: StatusWord = StatusWord(0x42);
    pub const OUTPUT_WRITE: StatusWord = StatusWord(0x10);
    pub const HALT_ACK: StatusWord = StatusWord(0x8a);

    pub fn bits(&self) -> u8 {
        self.0
    }

    fn has(&self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub fn is_fetch(&self) -> bool {
        self.has(StatusWord::M1)
    }

    pub fn is_write(&self) -> bool {
        !self.has(StatusWord::WO)
    }

    pub fn is_stack(&self) -> bool {
        self.has(StatusWord::STACK)
    }

    pub fn is_halt_ack(&self) -> bool {
        self.has(StatusWord::HLTA)
    }

    pub fn is_input(&self) -> bool {
        self.has(StatusWord::INP)
    }

    pub fn is_output(&self) -> bool {
        self.has(StatusWord::OUT)
    }

    pub fn is_memory_read(&self) -> bool {
        self.has(StatusWord::MEMR)
    }
}

impl fmt::Debug for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "StatusWord({:#04x})", self.0)
    }
}

/// The kinds of machine cycle the core runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleType {
    Fetch,
    MemRead,
    MemWrite,
    StackRead,
    StackWrite,
    InputRead,
    OutputWrite,
    HaltAck,
}

impl CycleType {

    pub fn status(&self) -> StatusWord {
        match *self {
            CycleType::Fetch => StatusWord::FETCH,
            CycleType::MemRead => StatusWord::MEM_READ,
            CycleType::MemWrite => StatusWord::MEM_WRITE,
            CycleType::StackRead => StatusWord::STACK_READ,
            CycleType::StackWrite => StatusWord::STACK_WRITE,
            CycleType::InputRead => StatusWord::INPUT_READ,
            CycleType::OutputWrite => StatusWord::OUTPUT_WRITE,
            CycleType::HaltAck => StatusWord::HALT_ACK,
        }
    }
}

/// What the core announces with SYNC at the start of a machine cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPulse {
    pub address: u16,
    pub status: StatusWord,
}

impl SyncPulse {

    /// The byte a front panel shows on its data lamps for this cycle: all ones while the
    /// core is about to write, the sense switches for a read of their port, memory
    /// otherwise.
    pub fn lamp_data(&self, memory: &Memory, sense_switches: u8) -> u8 {
        if self.status.bits() == 0 || self.status.is_write() {
            0xff
        } else if self.status == StatusWord::INPUT_READ {
            if self.address == SENSE_SWITCH_PORT { sense_switches } else { 0xff }
        } else {
            memory[self.address]
        }
    }
}

/// How a controller answers a SYNC pulse.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncResponse {
    /// Byte to place on the data lines for the rest of the status phase.
    pub data: Option<u8>,
    /// The controller pulled READY low: the cycle stalls in WaitState before its data phase.
    pub hold: bool,
}

/// Byte halves of the 16 front panel switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchGroup {
    Low,
    High,
}

/// The party on the other side of the bus.
///
/// Every method runs on the core's thread. A controller shared with another thread keeps
/// its state behind its own synchronisation.
pub trait BusController {

    /// Called once per machine cycle, after address and status are on the lines.
    fn on_sync(&mut self, pulse: SyncPulse, memory: &Memory) -> SyncResponse;

    /// The byte returned by a memory read cycle.
    fn read_data(&mut self, address: u16, memory: &Memory) -> u8 {
        memory[address]
    }

    fn read_switches(&mut self, group: SwitchGroup) -> u8;

    /// Current state of the READY input.
    fn ready(&self) -> bool;

    /// Called on every WaitState poll, while the core is stalled.
    fn service_wait(&mut self, _lines: &BusLines, _memory: &mut Memory) {}
}

/// The signals the core drives, readable from any thread.
///
/// The core is the only writer.
#[derive(Debug)]
pub struct BusLines {
    address: AtomicU16,
    data: AtomicU8,
    status: AtomicU8,
    dbin: AtomicBool,
    wr: AtomicBool,
    wait: AtomicBool,
    inte: AtomicBool,
}

impl Default for BusLines {
    fn default() -> BusLines {
        BusLines {
            address: AtomicU16::new(0),
            data: AtomicU8::new(0),
            status: AtomicU8::new(0),
            dbin: AtomicBool::new(false),
            // WR is active low
            wr: AtomicBool::new(true),
            wait: AtomicBool::new(false),
            inte: AtomicBool::new(false),
        }
    }
}

impl BusLines {

    pub fn new() -> BusLines {
        Default::default()
    }

    pub fn address(&self) -> u16 {
        self.address.load(Ordering::SeqCst)
    }

    pub fn data(&self) -> u8 {
        self.data.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> StatusWord {
        StatusWord(self.status.load(Ordering::SeqCst))
    }

    pub fn dbin(&self) -> bool {
        self.dbin.load(Ordering::SeqCst)
    }

    pub fn wr(&self) -> bool {
        self.wr.load(Ordering::SeqCst)
    }

    pub fn wait(&self) -> bool {
        self.wait.load(Ordering::SeqCst)
    }

    pub fn inte(&self) -> bool {
        self.inte.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> BusSnapshot {
        BusSnapshot {
            address: self.address(),
            data: self.data(),
            status: self.status(),
            dbin: self.dbin(),
            wr: self.wr(),
            wait: self.wait(),
            inte: self.inte(),
        }
    }

    pub(crate) fn set_address(&self, address: u16) {
        self.address.store(address, Ordering::SeqCst)
    }

    pub(crate) fn set_data(&self, data: u8) {
        self.data.store(data, Ordering::SeqCst)
    }

    pub(crate) fn set_status(&self, status: StatusWord) {
        self.status.store(status.bits(), Ordering::SeqCst)
    }

    pub(crate) fn set_dbin(&self, dbin: bool) {
        self.dbin.store(dbin, Ordering::SeqCst)
    }

    pub(crate) fn set_wr(&self, wr: bool) {
        self.wr.store(wr, Ordering::SeqCst)
    }

    pub(crate) fn set_wait(&self, wait: bool) {
        self.wait.store(wait, Ordering::SeqCst)
    }

    pub(crate) fn set_inte(&self, inte: bool) {
        self.inte.store(inte, Ordering::SeqCst)
    }
}

/// A copy of every line taken at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusSnapshot {
    pub address: u16,
    pub data: u8,
    pub status: StatusWord,
    pub dbin: bool,
    pub wr: bool,
    pub wait: bool,
    pub inte: bool,
}
