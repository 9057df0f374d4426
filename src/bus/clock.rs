/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Pacing of the elementary bus states.

use std::hint;
use std::thread;
use std::time::{Duration, Instant};

/// Duration of one bus state of a 2 MHz 8080.
pub const STATE_DURATION: Duration = Duration::from_nanos(500);

// Below this the end of a state is reached by spinning rather than sleeping.
const SPIN_THRESHOLD: Duration = Duration::from_micros(200);

/// Gives every bus state its duration. A state opens with `start_state` and closes with
/// `end_state`; WaitState paces its READY polling with `poll`.
pub trait Clock {

    fn start_state(&mut self);

    fn end_state(&mut self);

    /// One poll interval of WaitState.
    fn poll(&mut self) {
        self.start_state();
        self.end_state();
    }

    /// Bus states elapsed so far, wait polls included.
    fn states(&self) -> u64;
}

impl<K: Clock + ?Sized> Clock for Box<K> {
    fn start_state(&mut self) {
        (**self).start_state()
    }

    fn end_state(&mut self) {
        (**self).end_state()
    }

    fn poll(&mut self) {
        (**self).poll()
    }

    fn states(&self) -> u64 {
        (**self).states()
    }
}

/// Holds each state to a minimum wall-clock duration measured on the monotonic clock.
#[derive(Debug)]
pub struct RealTimeClock {
    state: Duration,
    started: Instant,
    states: u64,
}

impl RealTimeClock {

    pub fn new(state: Duration) -> RealTimeClock {
        RealTimeClock { state, started: Instant::now(), states: 0 }
    }
}

impl Clock for RealTimeClock {

    fn start_state(&mut self) {
        self.started = Instant::now();
    }

    fn end_state(&mut self) {
        let deadline = self.started + self.state;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let remaining = deadline - now;
            if remaining > SPIN_THRESHOLD {
                thread::sleep(remaining - SPIN_THRESHOLD);
            } else {
                hint::spin_loop();
            }
        }
        self.states += 1;
    }

    fn poll(&mut self) {
        self.start_state();
        thread::yield_now();
        self.end_state();
    }

    fn states(&self) -> u64 {
        self.states
    }
}

/// Counts states without spending any time in them.
#[derive(Debug, Default)]
pub struct UnpacedClock {
    states: u64,
}

impl UnpacedClock {

    pub fn new() -> UnpacedClock {
        Default::default()
    }
}

impl Clock for UnpacedClock {

    fn start_state(&mut self) {}

    fn end_state(&mut self) {
        self.states += 1;
    }

    fn poll(&mut self) {
        thread::yield_now();
        self.states += 1;
    }

    fn states(&self) -> u64 {
        self.states
    }
}

/// How the core paces its bus states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    RealTime(Duration),
    Unpaced,
}

impl Pacing {

    pub fn clock(&self) -> Box<dyn Clock + Send> {
        match *self {
            Pacing::RealTime(state) => Box::new(RealTimeClock::new(state)),
            Pacing::Unpaced => Box::new(UnpacedClock::new()),
        }
    }
}

impl Default for Pacing {
    fn default() -> Pacing {
        Pacing::RealTime(STATE_DURATION)
    }
}
