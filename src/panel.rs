/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The Altair front panel: run, stop, single step, examine and deposit.
//!
//! A panel comes in two halves. [`PanelPort`] is the [`BusController`] the core drives on
//! its own thread; [`FrontPanel`] is the operator side, cheap to clone and usable from any
//! thread. They meet in one mutex-guarded state with a condition variable signalled on
//! every change, so a switch operation can block until the core has reached the next
//! machine cycle.
//!
//! Examine and deposit work the way the hardware does: the panel jams instruction bytes
//! on the data lines while stepping the core one machine cycle at a time, and stores into
//! memory while the core is stalled in WaitState.

use std::collections::BTreeSet;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, trace};

use crate::bus::{
    BusController, BusLines, BusSnapshot, StatusWord, SwitchGroup, SyncPulse, SyncResponse,
};
use crate::memory::Memory;

/// How long a switch operation waits for the core to reach its next stall.
pub const HANDOFF_TIMEOUT: Duration = Duration::from_secs(2);

const JMP: u8 = 0xc3;
const NOP: u8 = 0x00;

#[derive(Debug)]
struct PanelState {
    /// The READY input of the core.
    ready: bool,
    /// The core has announced its current cycle and is polling READY.
    held: bool,
    stop: bool,
    step: bool,
    halted: bool,
    switches: u16,
    /// Synthetic byte answering memory reads instead of memory.
    jam: Option<u8>,
    deposit: Option<u8>,
    breakpoints: BTreeSet<u16>,
}

struct Shared {
    state: Mutex<PanelState>,
    changed: Condvar,
}

impl Shared {

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until `condition` holds or `timeout` elapses. The flag tells which.
    fn wait_until<'a, F>(
        &self,
        guard: MutexGuard<'a, PanelState>,
        timeout: Duration,
        mut condition: F,
    ) -> (MutexGuard<'a, PanelState>, bool)
        where F: FnMut(&PanelState) -> bool {
        let (guard, _) = self.changed
            .wait_timeout_while(guard, timeout, |state| !condition(state))
            .unwrap_or_else(PoisonError::into_inner);
        let met = condition(&guard);
        (guard, met)
    }
}

/// Operator side of the panel.
#[derive(Clone)]
pub struct FrontPanel {
    shared: Arc<Shared>,
    lines: Arc<BusLines>,
}

/// Core side of the panel.
pub struct PanelPort {
    shared: Arc<Shared>,
}

impl FrontPanel {

    /// Builds both halves of a panel watching `lines`. The machine powers on stopped:
    /// READY starts low.
    pub fn new(lines: Arc<BusLines>, switches: u16) -> (FrontPanel, PanelPort) {
        let shared = Arc::new(Shared {
            state: Mutex::new(PanelState {
                ready: false,
                held: false,
                stop: false,
                step: false,
                halted: false,
                switches,
                jam: None,
                deposit: None,
                breakpoints: BTreeSet::new(),
            }),
            changed: Condvar::new(),
        });
        (FrontPanel { shared: Arc::clone(&shared), lines }, PanelPort { shared })
    }

    /// Raises READY and lets the core run freely.
    pub fn run(&self) {
        let mut state = self.shared.lock();
        info!("run");
        state.ready = true;
        state.held = false;
        state.halted = false;
        self.shared.changed.notify_all();
    }

    /// Asks the core to stop at its next instruction fetch.
    pub fn stop(&self) {
        info!("stop");
        self.shared.lock().stop = true;
        self.shared.changed.notify_all();
    }

    /// Lets the stalled core complete one machine cycle and stall again at the next one.
    /// Returns false when the core was not stalled, or did not stall again in time.
    pub fn single_step(&self) -> bool {
        let state = self.shared.lock();
        if !state.held {
            return false;
        }
        let (state, stepped) = self.release_cycle(state);
        drop(state);
        stepped
    }

    /// Moves the core to the address on the switches by jamming `JMP addr` into the fetch
    /// it is stalled on.
    pub fn examine(&self) -> bool {
        let mut state = self.shared.lock();
        if !self.stalled_at_fetch(&state) {
            return false;
        }
        let [high, low] = state.switches.to_be_bytes();
        debug!("examine {:#06x}", state.switches);
        for byte in [JMP, low, high] {
            state.jam = Some(byte);
            let (next, stepped) = self.release_cycle(state);
            state = next;
            if !stepped {
                state.jam = None;
                return false;
            }
        }
        state.jam = None;
        true
    }

    /// Advances the core to the next address by jamming a `NOP`.
    pub fn examine_next(&self) -> bool {
        let mut state = self.shared.lock();
        if !self.stalled_at_fetch(&state) {
            return false;
        }
        state.jam = Some(NOP);
        let (mut state, stepped) = self.release_cycle(state);
        state.jam = None;
        stepped
    }

    /// Stores the low switch byte at the address the stalled core shows.
    pub fn deposit(&self) -> bool {
        let mut state = self.shared.lock();
        if !state.held {
            return false;
        }
        let [_, value] = state.switches.to_be_bytes();
        debug!("deposit {:#04x} at {:#06x}", value, self.lines.address());
        state.deposit = Some(value);
        self.shared.changed.notify_all();
        let (mut state, stored) = self.shared.wait_until(state, HANDOFF_TIMEOUT, |state| {
            state.deposit.is_none()
        });
        state.deposit = None;
        stored
    }

    pub fn deposit_next(&self) -> bool {
        self.examine_next() && self.deposit()
    }

    pub fn set_switches(&self, switches: u16) {
        self.shared.lock().switches = switches;
    }

    pub fn switches(&self) -> u16 {
        self.shared.lock().switches
    }

    /// Stops the core at every fetch from `address`.
    pub fn set_breakpoint(&self, address: u16) {
        self.shared.lock().breakpoints.insert(address);
    }

    pub fn clear_breakpoint(&self, address: u16) {
        self.shared.lock().breakpoints.remove(&address);
    }

    /// What the lamps show right now.
    pub fn lamps(&self) -> BusSnapshot {
        self.lines.snapshot()
    }

    pub fn is_held(&self) -> bool {
        self.shared.lock().held
    }

    pub fn is_halted(&self) -> bool {
        self.shared.lock().halted
    }

    /// Blocks until the core is stalled waiting for READY.
    pub fn wait_until_held(&self, timeout: Duration) -> bool {
        let state = self.shared.lock();
        self.shared.wait_until(state, timeout, |state| state.held).1
    }

    /// Blocks until the core is stalled on a HLT.
    pub fn wait_until_halted(&self, timeout: Duration) -> bool {
        let state = self.shared.lock();
        self.shared.wait_until(state, timeout, |state| state.halted && state.held).1
    }

    /// Drops READY and forgets every pending request, ahead of a reset.
    pub(crate) fn prepare_reset(&self) {
        let mut state = self.shared.lock();
        state.ready = false;
        state.held = false;
        state.stop = false;
        state.step = false;
        state.halted = false;
        state.jam = None;
        state.deposit = None;
        self.shared.changed.notify_all();
    }

    fn stalled_at_fetch(&self, state: &PanelState) -> bool {
        state.held && self.lines.status().is_fetch()
    }

    fn release_cycle<'a>(&'a self, mut state: MutexGuard<'a, PanelState>) -> (MutexGuard<'a, PanelState>, bool) {
        state.step = true;
        state.ready = true;
        state.held = false;
        state.halted = false;
        self.shared.changed.notify_all();
        self.shared.wait_until(state, HANDOFF_TIMEOUT, |state| state.held)
    }
}

impl BusController for PanelPort {

    fn on_sync(&mut self, pulse: SyncPulse, memory: &Memory) -> SyncResponse {
        let mut state = self.shared.lock();
        trace!("sync {:?} at {:#06x}", pulse.status, pulse.address);
        let [sense, _] = state.switches.to_be_bytes();
        let data = pulse.lamp_data(memory, sense);
        let mut hold = false;
        if pulse.status.is_fetch() {
            if state.stop {
                state.stop = false;
                hold = true;
                info!("stopped at {:#06x}", pulse.address);
            }
            if state.breakpoints.contains(&pulse.address) {
                hold = true;
                info!("breakpoint at {:#06x}", pulse.address);
            }
        }
        if state.step {
            state.step = false;
            hold = true;
        }
        if pulse.status == StatusWord::HALT_ACK {
            state.halted = true;
            hold = true;
            info!("halted at {:#06x}", pulse.address);
        }
        if hold {
            state.ready = false;
            self.shared.changed.notify_all();
        }
        SyncResponse { data: Some(data), hold }
    }

    fn read_data(&mut self, address: u16, memory: &Memory) -> u8 {
        self.shared.lock().jam.unwrap_or(memory[address])
    }

    fn read_switches(&mut self, group: SwitchGroup) -> u8 {
        let [high, low] = self.shared.lock().switches.to_be_bytes();
        match group {
            SwitchGroup::Low => low,
            SwitchGroup::High => high,
        }
    }

    fn ready(&self) -> bool {
        self.shared.lock().ready
    }

    fn service_wait(&mut self, lines: &BusLines, memory: &mut Memory) {
        let mut state = self.shared.lock();
        let mut changed = false;
        if !state.ready && !state.held {
            state.held = true;
            changed = true;
        }
        if let Some(value) = state.deposit.take() {
            memory[lines.address()] = value;
            lines.set_data(value);
            changed = true;
        }
        if changed {
            self.shared.changed.notify_all();
        }
    }
}
