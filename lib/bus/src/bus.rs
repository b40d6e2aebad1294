/*++

Licensed under the Apache-2.0 license.

File Name:

    bus.rs

Abstract:

    File contains definition of the Bus trait.

--*/

use axil_emu_types::{AxiAddr, AxiData, AxiResp};
use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BusError {
    /// Load address misaligned
    LoadAddrMisaligned,

    /// Load access fault
    LoadAccessFault,

    /// Store address misaligned
    StoreAddrMisaligned,

    /// Store access fault
    StoreAccessFault,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::LoadAddrMisaligned => write!(f, "load address misaligned"),
            BusError::LoadAccessFault => write!(f, "load access fault"),
            BusError::StoreAddrMisaligned => write!(f, "store address misaligned"),
            BusError::StoreAccessFault => write!(f, "store access fault"),
        }
    }
}

impl std::error::Error for BusError {}

impl From<BusError> for AxiResp {
    /// A misaligned access reached a device that refused it (SLVERR); an
    /// access fault means no device decoded the address (DECERR).
    fn from(err: BusError) -> AxiResp {
        match err {
            BusError::LoadAddrMisaligned | BusError::StoreAddrMisaligned => AxiResp::SlvErr,
            BusError::LoadAccessFault | BusError::StoreAccessFault => AxiResp::DecErr,
        }
    }
}

/// Represents an abstract register bus carrying 32-bit words. Used by the
/// upstream responder to reach the memory behind the adapter, and by tests to
/// drive word accesses through the adapter.
pub trait Bus {
    /// Read a word from the given address
    ///
    /// # Arguments
    ///
    /// * `addr` - Address to read from
    ///
    /// # Error
    ///
    /// * `BusError` - `BusError::LoadAccessFault` or `BusError::LoadAddrMisaligned`
    fn read(&mut self, addr: AxiAddr) -> Result<AxiData, BusError>;

    /// Write a word to the given address
    ///
    /// # Arguments
    ///
    /// * `addr` - Address to write
    /// * `val` - Data to write
    ///
    /// # Error
    ///
    /// * `BusError` - `BusError::StoreAccessFault` or `BusError::StoreAddrMisaligned`
    fn write(&mut self, addr: AxiAddr, val: AxiData) -> Result<(), BusError>;

    /// This method is used to notify devices of the passage of time. The
    /// owner of this bus MAY call this function periodically, or in response to
    /// a previously scheduled timer event.
    fn poll(&mut self) {
        // By default, do nothing
    }

    fn warm_reset(&mut self) {
        // By default, do nothing
    }
}

impl<T: Bus + ?Sized> Bus for Box<T> {
    fn read(&mut self, addr: AxiAddr) -> Result<AxiData, BusError> {
        T::read(self, addr)
    }

    fn write(&mut self, addr: AxiAddr, val: AxiData) -> Result<(), BusError> {
        T::write(self, addr, val)
    }

    fn poll(&mut self) {
        T::poll(self)
    }

    fn warm_reset(&mut self) {
        T::warm_reset(self)
    }
}
