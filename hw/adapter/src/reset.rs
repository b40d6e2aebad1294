// Licensed under the Apache-2.0 license

/// What a clock edge does to the coordinators.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResetEdge {
    /// `rstn` sampled low: clear all in-flight state.
    Hold,
    /// First edge with `rstn` high: leave reset without forwarding.
    Release,
    /// Normal operation.
    Run,
}

/// One-deep synchronous reset register. Powers up asserted.
#[derive(Debug)]
pub struct ResetControl {
    in_reset: bool,
    cycles_held: u64,
}

impl Default for ResetControl {
    fn default() -> Self {
        Self::new()
    }
}

impl ResetControl {
    pub fn new() -> Self {
        Self {
            in_reset: true,
            cycles_held: 0,
        }
    }

    /// Combinational gate on every valid and ready output.
    pub fn forwarding_enabled(&self, rstn: bool) -> bool {
        rstn && !self.in_reset
    }

    pub fn in_reset(&self) -> bool {
        self.in_reset
    }

    /// Number of consecutive edges `rstn` has been sampled low.
    pub fn cycles_held(&self) -> u64 {
        self.cycles_held
    }

    pub fn clock(&mut self, rstn: bool) -> ResetEdge {
        if !rstn {
            if !self.in_reset {
                log::debug!("reset asserted");
            }
            self.in_reset = true;
            self.cycles_held += 1;
            ResetEdge::Hold
        } else if self.in_reset {
            log::debug!("reset released after {} edges", self.cycles_held);
            self.in_reset = false;
            self.cycles_held = 0;
            ResetEdge::Release
        } else {
            ResetEdge::Run
        }
    }
}
