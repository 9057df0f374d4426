/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Machine cycle sequencing: status phase, WaitState and data phase.

use std::sync::Arc;

use super::{
    BusController, BusLines, Clock, CycleType, SwitchGroup, SyncPulse, SyncResponse,
    SENSE_SWITCH_PORT,
};
use crate::cancel::CancellationToken;
use crate::memory::Memory;

/// Everything the core touches outside its register file.
pub(crate) struct Bus<C, K> {
    pub(crate) memory: Memory,
    pub(crate) controller: C,
    pub(crate) clock: K,
    pub(crate) lines: Arc<BusLines>,
    pub(crate) cancel: CancellationToken,
    machine_cycles: u64,
}

impl<C: BusController, K: Clock> Bus<C, K> {

    pub(crate) fn new(memory: Memory, controller: C, clock: K, lines: Arc<BusLines>) -> Bus<C, K> {
        Bus { memory, controller, clock, lines, cancel: CancellationToken::new(), machine_cycles: 0 }
    }

    pub(crate) fn machine_cycles(&self) -> u64 {
        self.machine_cycles
    }

    /// A state with no bus activity.
    pub(crate) fn idle(&mut self) {
        self.clock.start_state();
        self.clock.end_state();
    }

    /// T1: address and status on the lines, then SYNC.
    fn status_phase(&mut self, cycle: CycleType, address: u16) -> SyncResponse {
        self.clock.start_state();
        self.machine_cycles += 1;
        let status = cycle.status();
        self.lines.set_address(address);
        self.lines.set_status(status);
        // the data lines carry the status byte until the controller answers
        self.lines.set_data(status.bits());
        let response = self.controller.on_sync(SyncPulse { address, status }, &self.memory);
        if let Some(data) = response.data {
            self.lines.set_data(data);
        }
        self.clock.end_state();
        response
    }

    /// Stalls until READY or cancellation. Returns false when the stall was cancelled.
    pub(crate) fn wait_state(&mut self) -> bool {
        self.lines.set_wait(true);
        let granted = loop {
            if self.controller.ready() {
                break true;
            }
            if self.cancel.is_cancelled() {
                break false;
            }
            self.controller.service_wait(&self.lines, &mut self.memory);
            self.clock.poll();
        };
        self.lines.set_wait(false);
        granted
    }

    /// T1 and T2 of a read cycle, ending with DBIN asserted and READY honoured.
    fn read_strobe(&mut self, cycle: CycleType, address: u16) -> bool {
        let response = self.status_phase(cycle, address);
        self.clock.start_state();
        self.lines.set_dbin(true);
        self.clock.end_state();
        if response.hold || !self.controller.ready() {
            self.wait_state()
        } else {
            true
        }
    }

    /// T3 of a read cycle.
    fn read_transfer(&mut self, cycle: CycleType, address: u16) -> u8 {
        self.clock.start_state();
        let data = match cycle {
            CycleType::InputRead if address == SENSE_SWITCH_PORT => {
                self.controller.read_switches(SwitchGroup::High)
            }
            // nothing else answers on the I/O space
            CycleType::InputRead => 0xff,
            _ => self.controller.read_data(address, &self.memory),
        };
        self.lines.set_data(data);
        self.lines.set_dbin(false);
        self.clock.end_state();
        data
    }

    /// An M1 cycle. `None` when cancellation ended the stall before the opcode was read.
    pub(crate) fn fetch(&mut self, address: u16) -> Option<u8> {
        self.lines.set_wr(true);
        if self.read_strobe(CycleType::Fetch, address) {
            Some(self.read_transfer(CycleType::Fetch, address))
        } else {
            self.lines.set_dbin(false);
            None
        }
    }

    /// Any read cycle other than a fetch. A cancelled stall still completes the cycle.
    pub(crate) fn read(&mut self, cycle: CycleType, address: u16) -> u8 {
        self.read_strobe(cycle, address);
        self.read_transfer(cycle, address)
    }

    pub(crate) fn write(&mut self, cycle: CycleType, address: u16, value: u8) {
        let response = self.status_phase(cycle, address);
        self.clock.start_state();
        self.lines.set_wr(false);
        self.clock.end_state();
        if response.hold || !self.controller.ready() {
            self.wait_state();
        }
        self.clock.start_state();
        self.lines.set_data(value);
        match cycle {
            CycleType::MemWrite | CycleType::StackWrite => self.memory[address] = value,
            // no output device is attached
            _ => {}
        }
        self.clock.end_state();
        self.lines.set_wr(true);
    }

    /// Acknowledges HLT and parks in WaitState until READY or cancellation.
    pub(crate) fn halt(&mut self, address: u16) {
        self.status_phase(CycleType::HaltAck, address);
        // T2 and T3 of the acknowledge cycle
        self.idle();
        self.idle();
        self.wait_state();
    }
}
