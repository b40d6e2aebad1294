/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the word bus used behind the AXI4-Lite adapter.

--*/

mod bus;
mod clock;
mod dynamic_bus;
mod mem;
mod ram;
pub mod testing;

pub use crate::bus::{Bus, BusError};
pub use crate::clock::{ActionHandle, Clock, Timer, TimerAction};
pub use crate::dynamic_bus::DynamicBus;
pub use crate::mem::MemError;
pub use crate::ram::Ram;
