/*++

Licensed under the Apache-2.0 license.

File Name:

    ram.rs

Abstract:

    File contains implementation of RAM

--*/

use crate::{mem::Mem, Bus, BusError};
use axil_emu_types::{AxiAddr, AxiData};

/// Read/Write Memory Device
pub struct Ram {
    data: Mem,
}

impl Ram {
    /// Create a zero-filled RAM
    ///
    /// # Arguments
    ///
    /// * `size` - Size in bytes, rounded down to a whole number of words
    pub fn new(size: usize) -> Self {
        Self::with_words(vec![0; size / std::mem::size_of::<AxiData>()])
    }

    /// Create a RAM with the given initial contents
    pub fn with_words(words: Vec<AxiData>) -> Self {
        Self {
            data: Mem::new(words),
        }
    }

    pub fn mmap_size(&self) -> AxiAddr {
        self.data.len() as AxiAddr
    }

    pub fn words(&self) -> &[AxiData] {
        self.data.words()
    }
}

impl Bus for Ram {
    fn read(&mut self, addr: AxiAddr) -> Result<AxiData, BusError> {
        Ok(self.data.read(addr)?)
    }

    fn write(&mut self, addr: AxiAddr, val: AxiData) -> Result<(), BusError> {
        Ok(self.data.write(addr, val)?)
    }
}
