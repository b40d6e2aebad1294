/*++

Licensed under the Apache-2.0 license.

File Name:

    adapter.rs

Abstract:

    File contains the AXI4-Lite adapter: write and read coordinators behind a
    synchronous reset controller, exposed as explicit signal bundles.

--*/

use crate::read_path::{ReadPath, States as ReadState};
use crate::reset::{ResetControl, ResetEdge};
use crate::trace::VcdTrace;
use crate::write_path::{States as WriteState, WritePath};
use crate::{SigIn, SigOut};
use std::io;
use std::path::Path;

#[derive(Default)]
pub struct AxilAdapter {
    write: WritePath,
    read: ReadPath,
    reset: ResetControl,
    cycle: u64,
    tracer: Option<VcdTrace>,
}

impl AxilAdapter {
    /// Constructs an adapter held in reset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the outputs for the current tick: registered valids and
    /// payloads, plus readies passed through from the opposite port.
    pub fn eval(&self, input: &SigIn) -> SigOut {
        let enabled = self.reset.forwarding_enabled(input.rstn);
        let mut out = SigOut::default();
        self.write.eval(enabled, input, &mut out);
        self.read.eval(enabled, input, &mut out);
        out
    }

    /// One rising clock edge with `input` held across it. Returns the outputs
    /// of the following tick for the same inputs.
    pub fn tick(&mut self, input: &SigIn) -> SigOut {
        let out = self.eval(input);
        self.trace(input, &out);
        match self.reset.clock(input.rstn) {
            ResetEdge::Hold | ResetEdge::Release => {
                self.write.reset();
                self.read.reset();
            }
            ResetEdge::Run => {
                self.write.clock(input, &out);
                self.read.clock(input, &out);
            }
        }
        self.cycle += 1;
        self.eval(input)
    }

    pub fn write_state(&self) -> WriteState {
        self.write.state()
    }

    pub fn read_state(&self) -> ReadState {
        self.read.state()
    }

    pub fn in_reset(&self) -> bool {
        self.reset.in_reset()
    }

    /// Number of edges since construction.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Starts writing a VCD of both ports to `path`. Replaces any trace in
    /// progress.
    pub fn start_tracing(&mut self, path: &Path) -> io::Result<()> {
        self.stop_tracing();
        self.tracer = Some(VcdTrace::create(path)?);
        log::info!("tracing adapter signals to {}", path.display());
        Ok(())
    }

    /// Flush and close the trace started with `start_tracing()`.
    pub fn stop_tracing(&mut self) {
        if let Some(tracer) = self.tracer.take() {
            if let Err(e) = tracer.finish() {
                log::warn!("failed to flush signal trace: {e}");
            }
        }
    }

    fn trace(&mut self, input: &SigIn, out: &SigOut) {
        if let Some(tracer) = &mut self.tracer {
            if let Err(e) = tracer.record(self.cycle, input, out) {
                log::warn!("signal trace disabled: {e}");
                self.tracer = None;
            }
        }
    }
}

impl Drop for AxilAdapter {
    fn drop(&mut self) {
        self.stop_tracing();
    }
}
