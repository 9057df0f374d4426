/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use super::{BusController, SwitchGroup, SyncPulse, SyncResponse};
use crate::memory::Memory;

/// A controller with nothing attached: READY always high, memory answers every read and
/// the switches never move.
///
/// It can record every SYNC pulse, which makes it the controller of choice for tests and
/// for running programs without a front panel.
#[derive(Debug, Default, Clone)]
pub struct Headless {
    switches: u16,
    pulses: Option<Vec<SyncPulse>>,
}

impl Headless {

    pub fn new(switches: u16) -> Headless {
        Headless { switches, pulses: None }
    }

    /// Same as `new`, but keeps every pulse it sees.
    pub fn recording(switches: u16) -> Headless {
        Headless { switches, pulses: Some(Vec::new()) }
    }

    pub fn pulses(&self) -> &[SyncPulse] {
        self.pulses.as_deref().unwrap_or(&[])
    }

    pub fn clear_pulses(&mut self) {
        if let Some(pulses) = self.pulses.as_mut() {
            pulses.clear();
        }
    }
}

impl BusController for Headless {

    fn on_sync(&mut self, pulse: SyncPulse, memory: &Memory) -> SyncResponse {
        if let Some(pulses) = self.pulses.as_mut() {
            pulses.push(pulse);
        }
        let sense = self.read_switches(SwitchGroup::High);
        SyncResponse { data: Some(pulse.lamp_data(memory, sense)), hold: false }
    }

    fn read_switches(&mut self, group: SwitchGroup) -> u8 {
        let [high, low] = self.switches.to_be_bytes();
        match group {
            SwitchGroup::Low => low,
            SwitchGroup::High => high,
        }
    }

    fn ready(&self) -> bool {
        true
    }
}
