/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core and the machine around it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The fetched byte matched none of the decode patterns. Fatal: the run stops here.
    #[error("no instruction decodes from opcode {opcode:#04x} fetched at {pc:#06x}")]
    DecodeFault { opcode: u8, pc: u16 },
    #[error("image of {len} bytes does not fit in memory at {offset:#06x}")]
    ImageTooLarge { offset: u16, len: usize },
    #[error("the cpu worker thread panicked")]
    WorkerPanicked,
    #[error("the cpu worker is not running")]
    NotRunning,
    #[error("could not spawn the cpu worker: {0}")]
    Spawn(String),
}
