/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the AXI4-Lite adapter model.

--*/

mod adapter;
mod handshake;
mod read_path;
mod reset;
mod signals;
mod trace;
mod write_path;

pub use adapter::AxilAdapter;
pub use handshake::{Sink, Source};
pub use read_path::{ReadData, States as ReadState};
pub use reset::{ResetControl, ResetEdge};
pub use signals::{SigIn, SigOut};
pub use trace::{VcdTrace, CLOCK_PERIOD_NS};
pub use write_path::States as WriteState;
