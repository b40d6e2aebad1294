// Licensed under the Apache-2.0 license

use std::fmt;
use std::path::PathBuf;

use axil_emu_types::{AxiAddr, AxiChannel, AxiData, AxiResp};

mod axil_bus;
mod bus_logger;
mod model;
mod monitor;
mod originator;
mod policy;
mod responder;
pub mod scenarios;

pub use axil_bus::AxilBus;
pub use bus_logger::{BusLogger, LogFile};
pub use model::AdapterModel;
pub use monitor::{Port, ProtocolMonitor, Violation, ViolationKind};
pub use originator::{Originator, ReadResult, WriteResult};
pub use policy::{ReadyGen, ReadyPolicy};
pub use responder::{Responder, ResponderStats};

/// Environment variable naming a VCD file to trace adapter signals into.
pub const TRACE_PATH_ENV: &str = "AXIL_TRACE_PATH";

pub struct InitParams {
    /// Base address of the RAM window behind the responder
    pub mem_base: AxiAddr,

    /// Size of the RAM window in bytes
    pub mem_size: u32,

    /// Edges `rstn` is held low, at init and for each scheduled reset
    pub reset_cycles: u64,

    /// Edges to wait after reset release before returning from init
    pub settle_cycles: u64,

    /// Edges a blocking transaction may wait before failing
    pub timeout_cycles: u64,

    /// Extra edges between a request reaching the responder and its response
    pub response_latency: u64,

    /// Ready policy of the responder on the upstream port
    pub upstream_ready: ReadyPolicy,

    /// BREADY/RREADY policy of the originator on the downstream port
    pub downstream_ready: ReadyPolicy,

    pub seed: u64,

    /// VCD output; falls back to `AXIL_TRACE_PATH`
    pub trace_path: Option<PathBuf>,

    /// Responder transaction log
    pub bus_log: Option<LogFile>,
}

impl Default for InitParams {
    fn default() -> Self {
        Self {
            mem_base: 0x0000_0000,
            mem_size: 0x0001_0000,
            reset_cycles: 5,
            settle_cycles: 5,
            timeout_cycles: 64,
            response_latency: 0,
            upstream_ready: ReadyPolicy::Always,
            downstream_ready: ReadyPolicy::Always,
            seed: 0,
            trace_path: None,
            bus_log: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModelError {
    /// A transaction is already in flight on this path
    PathBusy,

    /// A handshake did not complete in time
    Timeout { channel: AxiChannel, cycles: u64 },

    /// The transaction was dropped by reset
    Aborted,

    /// A transaction that had to succeed returned an error response
    InvalidResponse { addr: AxiAddr, resp: AxiResp },

    ReadbackMismatch {
        addr: AxiAddr,
        expected: AxiData,
        actual: AxiData,
    },

    /// A write completed, but later than an unthrottled adapter allows
    LatencyExceeded { addr: AxiAddr, cycles: u64, limit: u64 },

    ProtocolViolation(Violation),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::PathBusy => write!(f, "transaction already in flight"),
            ModelError::Timeout { channel, cycles } => {
                write!(f, "{channel} handshake timed out after {cycles} cycles")
            }
            ModelError::Aborted => write!(f, "transaction aborted by reset"),
            ModelError::InvalidResponse { addr, resp } => {
                write!(f, "access to {addr:#010x} returned {resp}")
            }
            ModelError::ReadbackMismatch {
                addr,
                expected,
                actual,
            } => write!(
                f,
                "read of {addr:#010x} returned {actual:#010x}, expected {expected:#010x}"
            ),
            ModelError::LatencyExceeded {
                addr,
                cycles,
                limit,
            } => write!(
                f,
                "write to {addr:#010x} took {cycles} cycles, limit is {limit}"
            ),
            ModelError::ProtocolViolation(v) => write!(f, "protocol violation: {v}"),
        }
    }
}

impl std::error::Error for ModelError {}
