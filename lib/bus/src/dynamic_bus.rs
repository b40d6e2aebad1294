/*++

Licensed under the Apache-2.0 license.

File Name:

    dynamic_bus.rs

Abstract:

    File contains DynamicBus type.

--*/

use std::{io::ErrorKind, ops::RangeInclusive};

use crate::{Bus, BusError};
use axil_emu_types::{AxiAddr, AxiData};

struct MappedDevice {
    name: String,
    mmap_range: RangeInclusive<AxiAddr>,
    bus: Box<dyn Bus>,
}

/// A bus that delegates to a runtime-modifiable list of devices, each mapped
/// at its own address window. Addresses outside every window fault, which the
/// responder reports as DECERR.
#[derive(Default)]
pub struct DynamicBus {
    /// Devices sorted by window start
    devs: Vec<MappedDevice>,
}

impl DynamicBus {
    pub fn new() -> DynamicBus {
        Self { devs: Vec::new() }
    }

    /// Attach the specified device at `mmap_range`
    ///
    /// # Arguments
    ///
    /// * `name` - Device name used in diagnostics
    /// * `mmap_range` - Inclusive address window
    /// * `bus` - Device to attach
    pub fn attach_dev(
        &mut self,
        name: &str,
        mmap_range: RangeInclusive<AxiAddr>,
        bus: Box<dyn Bus>,
    ) -> std::io::Result<()> {
        let mut index = 0;
        for cur_dev in self.devs.iter() {
            let cur = &cur_dev.mmap_range;
            if mmap_range.end() >= cur.start() && mmap_range.start() <= cur.end() {
                return Err(std::io::Error::new(
                    ErrorKind::AddrInUse,
                    format!("Address space for device {} ({:#010x}-{:#010x}) collides with device {} ({:#010x}-{:#010x})",
                    name, mmap_range.start(), mmap_range.end(),
                    cur_dev.name, cur.start(), cur.end())));
            }
            if mmap_range.start() < cur.start() {
                break;
            }
            index += 1;
        }
        log::debug!(
            "attached {name} at {:#010x}-{:#010x}",
            mmap_range.start(),
            mmap_range.end()
        );
        self.devs.insert(
            index,
            MappedDevice {
                name: name.into(),
                mmap_range,
                bus,
            },
        );
        Ok(())
    }
}

impl Bus for DynamicBus {
    fn read(&mut self, addr: AxiAddr) -> Result<AxiData, BusError> {
        let dev = self.devs.iter_mut().find(|d| d.mmap_range.contains(&addr));
        match dev {
            Some(dev) => dev.bus.read(addr - dev.mmap_range.start()),
            None => Err(BusError::LoadAccessFault),
        }
    }

    fn write(&mut self, addr: AxiAddr, val: AxiData) -> Result<(), BusError> {
        let dev = self.devs.iter_mut().find(|d| d.mmap_range.contains(&addr));
        match dev {
            Some(dev) => dev.bus.write(addr - dev.mmap_range.start(), val),
            None => Err(BusError::StoreAccessFault),
        }
    }

    fn poll(&mut self) {
        for dev in self.devs.iter_mut() {
            dev.bus.poll();
        }
    }

    fn warm_reset(&mut self) {
        for dev in self.devs.iter_mut() {
            dev.bus.warm_reset();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{testing::FakeBus, Ram};

    #[test]
    fn test_dynamic_bus_read() {
        let mut bus = DynamicBus::new();
        let ram = Ram::with_words(vec![1, 2]);
        bus.attach_dev("RAM0", 0x100..=0x107, Box::new(ram)).unwrap();
        assert_eq!(bus.read(0x100).ok(), Some(1));
        assert_eq!(bus.read(0x104).ok(), Some(2));
        assert_eq!(bus.read(0x108).err(), Some(BusError::LoadAccessFault));
        assert_eq!(bus.read(0xfc).err(), Some(BusError::LoadAccessFault));
    }

    #[test]
    fn test_dynamic_bus_write() {
        let mut bus = DynamicBus::new();
        let ram = Ram::new(8);
        bus.attach_dev("RAM0", 0x100..=0x107, Box::new(ram)).unwrap();
        assert_eq!(bus.write(0x100, 3).ok(), Some(()));
        assert_eq!(bus.read(0x100).ok(), Some(3));
        assert_eq!(bus.write(0x104, 4).ok(), Some(()));
        assert_eq!(bus.read(0x104).ok(), Some(4));
        assert_eq!(bus.write(0x108, 0).err(), Some(BusError::StoreAccessFault));
    }

    #[test]
    fn test_dynamic_bus_forwards_offset() {
        let mut bus = DynamicBus::new();
        let fake = FakeBus::new();
        let log = fake.log.clone();
        bus.attach_dev("FAKE", 0x1000..=0x1fff, Box::new(fake)).unwrap();
        bus.write(0x1010, 0x55).unwrap();
        bus.read(0x1ffc).unwrap();
        assert_eq!(log.take(), "write(0x10, 0x55)\nread(0xffc)\n");
    }

    fn is_sorted<T>(slice: &[T]) -> bool
    where
        T: Ord,
    {
        slice.windows(2).all(|s| s[0] <= s[1])
    }

    #[test]
    fn test_attach_dev() {
        let mut bus = DynamicBus::new();
        bus.attach_dev("RAM0", 4..=11, Box::new(Ram::new(8))).unwrap();
        bus.attach_dev("RAM1", 0..=3, Box::new(Ram::new(4))).unwrap();
        bus.attach_dev("RAM2", 12..=15, Box::new(Ram::new(4))).unwrap();

        let err = bus
            .attach_dev("RAM3", 4..=7, Box::new(Ram::new(4)))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Address space for device RAM3 (0x00000004-0x00000007) collides with device RAM0 (0x00000004-0x0000000b)");

        let err = bus
            .attach_dev("RAM4", 8..=8, Box::new(Ram::new(4)))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Address space for device RAM4 (0x00000008-0x00000008) collides with device RAM0 (0x00000004-0x0000000b)");

        let addrs: Vec<AxiAddr> = bus
            .devs
            .iter()
            .flat_map(|d| [*d.mmap_range.start(), *d.mmap_range.end()])
            .collect();
        assert_eq!(addrs.len(), 6);
        assert!(is_sorted(&addrs));
        assert_eq!(
            bus.devs.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            ["RAM1", "RAM0", "RAM2"]
        );
    }
}
