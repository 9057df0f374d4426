/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};

pub const MEMORY_SIZE: usize = 0x10000;

/// The flat 64K address space of the machine.
///
/// Owned by the core once it is running; the front panel only reaches it through the
/// hooks the core offers during a wait state.
#[derive(Clone)]
pub struct Memory {
    bytes: Box<[u8]>,
}

impl Memory {

    pub fn new() -> Memory {
        Memory { bytes: vec![0; MEMORY_SIZE].into_boxed_slice() }
    }

    /// Builds a memory holding `image` at `offset`, zero elsewhere.
    pub fn with_image(offset: u16, image: &[u8]) -> Result<Memory> {
        let mut memory = Memory::new();
        memory.load(offset, image)?;
        Ok(memory)
    }

    /// Copies `image` into memory starting at `offset`. Nothing is written if it does not fit.
    pub fn load(&mut self, offset: u16, image: &[u8]) -> Result<()> {
        let start = offset as usize;
        let end = start + image.len();
        if end > MEMORY_SIZE {
            return Err(Error::ImageTooLarge { offset, len: image.len() });
        }
        self.bytes[start..end].copy_from_slice(image);
        Ok(())
    }

    pub fn read(&self, address: u16) -> u8 {
        self.bytes[address as usize]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}

impl Index<u16> for Memory {
    type Output = u8;

    fn index(&self, address: u16) -> &u8 {
        &self.bytes[address as usize]
    }
}

impl IndexMut<u16> for Memory {
    fn index_mut(&mut self, address: u16) -> &mut u8 {
        &mut self.bytes[address as usize]
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Memory({} bytes)", self.bytes.len())
    }
}
