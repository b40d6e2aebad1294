// Licensed under the Apache-2.0 license

use axil_emu_bus::{Bus, BusError};
use axil_emu_types::{AxiAddr, AxiData};

use crate::AdapterModel;

/// Register-style access to the memory behind the adapter. Every access is a
/// blocking AXI4-Lite transaction through the adapter's downstream port.
pub struct AxilBus<'a> {
    model: &'a mut AdapterModel,
}

impl<'a> AxilBus<'a> {
    pub(crate) fn new(model: &'a mut AdapterModel) -> Self {
        Self { model }
    }
}

impl Bus for AxilBus<'_> {
    fn read(&mut self, addr: AxiAddr) -> Result<AxiData, BusError> {
        if addr & 0x3 != 0 {
            return Err(BusError::LoadAddrMisaligned);
        }
        match self.model.axil_read(addr) {
            Ok(r) if !r.resp.is_error() => Ok(r.data),
            Ok(r) => {
                log::warn!("read {addr:#010x}: {}", r.resp);
                Err(BusError::LoadAccessFault)
            }
            Err(e) => {
                log::warn!("read {addr:#010x}: {e}");
                Err(BusError::LoadAccessFault)
            }
        }
    }

    fn write(&mut self, addr: AxiAddr, val: AxiData) -> Result<(), BusError> {
        if addr & 0x3 != 0 {
            return Err(BusError::StoreAddrMisaligned);
        }
        match self.model.axil_write(addr, val) {
            Ok(w) if !w.resp.is_error() => Ok(()),
            Ok(w) => {
                log::warn!("write {addr:#010x}: {}", w.resp);
                Err(BusError::StoreAccessFault)
            }
            Err(e) => {
                log::warn!("write {addr:#010x}: {e}");
                Err(BusError::StoreAccessFault)
            }
        }
    }

    fn poll(&mut self) {
        self.model.step();
    }
}
