// Licensed under the Apache-2.0 license

use std::{
    cell::RefCell,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    rc::Rc,
};

use axil_emu_bus::{Bus, BusError};
use axil_emu_types::{AxiAddr, AxiData};

#[derive(Clone)]
pub struct LogFile(Rc<RefCell<BufWriter<File>>>);
impl LogFile {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        Ok(Self(Rc::new(RefCell::new(BufWriter::new(File::create(
            path,
        )?)))))
    }
}
impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

/// Records every access the responder makes to its memory.
pub struct BusLogger<TBus: Bus> {
    pub bus: TBus,
    pub log: Option<LogFile>,
}
impl<TBus: Bus> BusLogger<TBus> {
    pub fn new(bus: TBus) -> Self {
        Self { bus, log: None }
    }

    fn log_read(&mut self, addr: AxiAddr, result: Result<AxiData, BusError>) {
        let Some(log) = &mut self.log else {
            return;
        };
        let written = match result {
            Ok(val) => writeln!(log, "AXIL  read *0x{addr:08x} -> 0x{val:x}"),
            Err(e) => writeln!(log, "AXIL  read *0x{addr:08x} ***FAULT {e:?}"),
        };
        self.check(written);
    }

    fn log_write(&mut self, addr: AxiAddr, val: AxiData, result: Result<(), BusError>) {
        let Some(log) = &mut self.log else {
            return;
        };
        let written = match result {
            Ok(()) => writeln!(log, "AXIL write *0x{addr:08x} <- 0x{val:x}"),
            Err(e) => writeln!(log, "AXIL write *0x{addr:08x} <- 0x{val:x} ***FAULT {e:?}"),
        };
        self.check(written);
    }

    fn check(&mut self, written: std::io::Result<()>) {
        if let Err(e) = written {
            log::warn!("bus log disabled: {e}");
            self.log = None;
        }
    }
}
impl<TBus: Bus> Bus for BusLogger<TBus> {
    fn read(&mut self, addr: AxiAddr) -> Result<AxiData, BusError> {
        let result = self.bus.read(addr);
        self.log_read(addr, result);
        result
    }

    fn write(&mut self, addr: AxiAddr, val: AxiData) -> Result<(), BusError> {
        let result = self.bus.write(addr, val);
        self.log_write(addr, val, result);
        result
    }

    fn poll(&mut self) {
        self.bus.poll();
    }

    fn warm_reset(&mut self) {
        if let Some(log) = &mut self.log {
            let written = log.flush();
            self.check(written);
        }
        self.bus.warm_reset();
    }
}

impl<TBus: Bus> Drop for BusLogger<TBus> {
    fn drop(&mut self) {
        if let Some(log) = &mut self.log {
            let _ = log.flush();
        }
    }
}
