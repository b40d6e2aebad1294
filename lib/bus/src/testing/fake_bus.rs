/*++

Licensed under the Apache-2.0 license.

File Name:

    fake_bus.rs

Abstract:

    File contains code for a fake implementation of the Bus trait.

--*/
use axil_emu_types::{AxiAddr, AxiData};

use crate::{testing::Log, Bus, BusError};
use std::fmt::Write;

/// A Bus implementation that logs all calls, and allows the user to override
/// the return value of the methods.
///
/// # Example
///
/// ```
/// use axil_emu_bus::{Bus, testing::FakeBus};
///
/// let mut fake_bus = FakeBus::new();
/// fake_bus.read_result = Ok(35);
/// assert_eq!(fake_bus.read(0xdeadcafc), Ok(35));
/// assert_eq!("read(0xdeadcafc)\n", fake_bus.log.take());
/// ```
pub struct FakeBus {
    pub log: Log,
    pub read_result: Result<AxiData, BusError>,
    pub write_result: Result<(), BusError>,
}
impl FakeBus {
    pub fn new() -> Self {
        Self {
            log: Log::new(),
            read_result: Ok(0),
            write_result: Ok(()),
        }
    }
}
impl Default for FakeBus {
    fn default() -> Self {
        Self::new()
    }
}
impl Bus for FakeBus {
    fn read(&mut self, addr: AxiAddr) -> Result<AxiData, BusError> {
        let _ = writeln!(self.log.w(), "read({addr:#x})");
        self.read_result
    }

    fn write(&mut self, addr: AxiAddr, val: AxiData) -> Result<(), BusError> {
        let _ = writeln!(self.log.w(), "write({addr:#x}, {val:#x})");
        self.write_result
    }

    fn poll(&mut self) {
        let _ = writeln!(self.log.w(), "poll()");
    }

    fn warm_reset(&mut self) {
        let _ = writeln!(self.log.w(), "warm_reset()");
    }
}
