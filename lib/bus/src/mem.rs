/*++

Licensed under the Apache-2.0 license.

File Name:

    mem.rs

Abstract:

    File contains the word-addressed storage used by memory devices.

--*/

use crate::BusError;
use axil_emu_types::{AxiAddr, AxiData};

/// Memory Exception
#[derive(Debug, PartialEq, Eq)]
pub enum MemError {
    /// Read Address misaligned
    ReadAddrMisaligned,

    /// Read Access fault
    ReadAccessFault,

    /// Write Address misaligned
    WriteAddrMisaligned,

    /// Write access fault
    WriteAccessFault,
}

impl From<MemError> for BusError {
    /// Converts to this type from the input type.
    fn from(exception: MemError) -> BusError {
        match exception {
            MemError::ReadAddrMisaligned => BusError::LoadAddrMisaligned,
            MemError::ReadAccessFault => BusError::LoadAccessFault,
            MemError::WriteAddrMisaligned => BusError::StoreAddrMisaligned,
            MemError::WriteAccessFault => BusError::StoreAccessFault,
        }
    }
}

const WORD_BYTES: usize = std::mem::size_of::<AxiData>();

/// Word storage. Addresses are byte offsets and must be word aligned.
pub struct Mem {
    words: Vec<AxiData>,
}

impl Mem {
    /// Create a new memory object
    ///
    /// # Arguments
    ///
    /// * `words` - Initial contents, one entry per 32-bit word
    pub fn new(words: Vec<AxiData>) -> Self {
        Self { words }
    }

    /// Size of the memory in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len() * WORD_BYTES
    }

    /// Immutable reference to data
    pub fn words(&self) -> &[AxiData] {
        &self.words
    }

    /// Read the word at byte offset `addr`
    ///
    /// # Error
    ///
    /// * `MemError::ReadAddrMisaligned` - `addr` is not word aligned
    /// * `MemError::ReadAccessFault` - Read beyond the end of the memory
    #[inline]
    pub fn read(&self, addr: AxiAddr) -> Result<AxiData, MemError> {
        let index = word_index(addr).ok_or(MemError::ReadAddrMisaligned)?;
        self.words
            .get(index)
            .copied()
            .ok_or(MemError::ReadAccessFault)
    }

    /// Write the word at byte offset `addr`
    ///
    /// # Error
    ///
    /// * `MemError::WriteAddrMisaligned` - `addr` is not word aligned
    /// * `MemError::WriteAccessFault` - Write beyond the end of the memory
    #[inline]
    pub fn write(&mut self, addr: AxiAddr, val: AxiData) -> Result<(), MemError> {
        let index = word_index(addr).ok_or(MemError::WriteAddrMisaligned)?;
        let word = self
            .words
            .get_mut(index)
            .ok_or(MemError::WriteAccessFault)?;
        *word = val;
        Ok(())
    }
}

fn word_index(addr: AxiAddr) -> Option<usize> {
    if addr as usize % WORD_BYTES != 0 {
        return None;
    }
    Some(addr as usize / WORD_BYTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len() {
        assert_eq!(Mem::new(vec![0; 4]).len(), 16);
        assert_eq!(Mem::new(vec![]).len(), 0);
    }

    #[test]
    fn test_read_write() {
        let mut mem = Mem::new(vec![0; 4]);
        assert_eq!(mem.write(8, 0xdead_beef), Ok(()));
        assert_eq!(mem.read(8), Ok(0xdead_beef));
        assert_eq!(mem.read(4), Ok(0));
        assert_eq!(mem.words(), &[0, 0, 0xdead_beef, 0]);
    }

    #[test]
    fn test_misaligned() {
        let mut mem = Mem::new(vec![0; 4]);
        assert_eq!(mem.read(2), Err(MemError::ReadAddrMisaligned));
        assert_eq!(mem.write(1, 0), Err(MemError::WriteAddrMisaligned));
    }

    #[test]
    fn test_out_of_range() {
        let mut mem = Mem::new(vec![0; 4]);
        assert_eq!(mem.read(16), Err(MemError::ReadAccessFault));
        assert_eq!(mem.write(0x1000, 0), Err(MemError::WriteAccessFault));
    }
}
