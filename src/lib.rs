/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! # Altair 8080
//!
//! An Intel 8080 core that runs every instruction as the machine cycles of the real chip:
//! each memory or I/O access publishes an address and a status word, raises SYNC, honours
//! READY and strobes data. This is what lets an Altair 8800 style front panel stop,
//! single step, examine and deposit through the bus the same way the hardware does.
//!
//! The main struct is [`Intel8080`](cpu/struct.Intel8080.html). It owns the memory and talks
//! to a [`BusController`](bus/trait.BusController.html). The crate ships two controllers:
//! [`Headless`](bus/struct.Headless.html), always ready, and the front panel in
//! [`panel`](panel/index.html). [`Altair`](machine/struct.Altair.html) runs a core wired
//! to a panel on its own thread.
//!
//! Running a program without any panel:
//!
//! ```
//! use altair_8080::bus::{Headless, UnpacedClock};
//! use altair_8080::cpu::{Intel8080, Step};
//! use altair_8080::memory::Memory;
//!
//! // MVI A,5 ; INR A ; HLT
//! let memory = Memory::with_image(0, &[0x3e, 0x05, 0x3c, 0x76]).unwrap();
//! let mut cpu = Intel8080::new(memory, Headless::new(0), UnpacedClock::new());
//! while cpu.step().unwrap() != Step::Halted {}
//! assert_eq!(cpu.registers().a, 6);
//! assert!(!cpu.flags().z);
//! ```

pub mod bus;
pub mod cancel;
pub mod cpu;
pub mod error;
pub mod machine;
pub mod memory;
pub mod opcode;
pub mod panel;

pub use crate::cancel::CancellationToken;
pub use crate::cpu::{Intel8080, Step};
pub use crate::error::{Error, Result};
pub use crate::machine::{Altair, MachineConfig};
pub use crate::memory::Memory;
