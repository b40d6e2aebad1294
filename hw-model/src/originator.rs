// Licensed under the Apache-2.0 license

use axil_adapter::{SigIn, SigOut};
use axil_emu_types::{AxiAddr, AxiChannel, AxiData, AxiResp};

use crate::policy::{ReadyGen, ReadyPolicy};
use crate::ModelError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WriteResult {
    pub addr: AxiAddr,
    pub data: AxiData,
    pub resp: AxiResp,
    /// Cycle the request was presented
    pub issued: u64,
    /// Cycle the response had been accepted by
    pub completed: u64,
}

impl WriteResult {
    pub fn latency(&self) -> u64 {
        self.completed - self.issued
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReadResult {
    pub addr: AxiAddr,
    pub data: AxiData,
    pub resp: AxiResp,
    pub issued: u64,
    pub completed: u64,
}

impl ReadResult {
    pub fn latency(&self) -> u64 {
        self.completed - self.issued
    }
}

struct PendingWrite {
    addr: AxiAddr,
    data: AxiData,
    issued: u64,
    aw_done: bool,
    w_done: bool,
}

struct PendingRead {
    addr: AxiAddr,
    issued: u64,
    ar_done: bool,
}

/// Downstream bus-functional model. Issues at most one write and one read at
/// a time and holds each request until the adapter accepts it.
pub struct Originator {
    write: Option<PendingWrite>,
    read: Option<PendingRead>,
    write_outcome: Option<Result<WriteResult, ModelError>>,
    read_outcome: Option<Result<ReadResult, ModelError>>,
    ready: ReadyGen,
    bready: bool,
    rready: bool,
}

impl Originator {
    pub fn new(policy: ReadyPolicy, seed: u64) -> Self {
        let mut ready = ReadyGen::new(policy, seed);
        Self {
            write: None,
            read: None,
            write_outcome: None,
            read_outcome: None,
            bready: ready.roll(),
            rready: ready.roll(),
            ready,
        }
    }

    pub fn start_write(&mut self, addr: AxiAddr, data: AxiData, now: u64) -> Result<(), ModelError> {
        if self.write.is_some() {
            return Err(ModelError::PathBusy);
        }
        log::trace!("originator: write {addr:#010x} <- {data:#010x}");
        self.write_outcome = None;
        self.write = Some(PendingWrite {
            addr,
            data,
            issued: now,
            aw_done: false,
            w_done: false,
        });
        Ok(())
    }

    pub fn start_read(&mut self, addr: AxiAddr, now: u64) -> Result<(), ModelError> {
        if self.read.is_some() {
            return Err(ModelError::PathBusy);
        }
        log::trace!("originator: read {addr:#010x}");
        self.read_outcome = None;
        self.read = Some(PendingRead {
            addr,
            issued: now,
            ar_done: false,
        });
        Ok(())
    }

    pub fn take_write_result(&mut self) -> Option<Result<WriteResult, ModelError>> {
        self.write_outcome.take()
    }

    pub fn take_read_result(&mut self) -> Option<Result<ReadResult, ModelError>> {
        self.read_outcome.take()
    }

    /// The handshake the in-flight write is waiting on, if any.
    pub fn write_channel(&self) -> Option<AxiChannel> {
        self.write.as_ref().map(|w| {
            if !w.aw_done {
                AxiChannel::WriteAddr
            } else if !w.w_done {
                AxiChannel::WriteData
            } else {
                AxiChannel::WriteResp
            }
        })
    }

    pub fn read_channel(&self) -> Option<AxiChannel> {
        self.read.as_ref().map(|r| {
            if !r.ar_done {
                AxiChannel::ReadAddr
            } else {
                AxiChannel::ReadData
            }
        })
    }

    pub fn drive(&self, input: &mut SigIn) {
        match &self.write {
            Some(w) => {
                input.s_axil_awaddr = w.addr;
                input.s_axil_awvalid = !w.aw_done;
                input.s_axil_wdata = w.data;
                input.s_axil_wvalid = !w.w_done;
            }
            None => {
                input.s_axil_awvalid = false;
                input.s_axil_wvalid = false;
            }
        }
        match &self.read {
            Some(r) => {
                input.s_axil_araddr = r.addr;
                input.s_axil_arvalid = !r.ar_done;
            }
            None => input.s_axil_arvalid = false,
        }
        input.s_axil_bready = self.bready;
        input.s_axil_rready = self.rready;
    }

    /// Sample one rising edge. `completed` is the cycle count once the edge
    /// has passed.
    pub fn clock(&mut self, input: &SigIn, out: &SigOut, completed: u64) {
        if let Some(w) = &mut self.write {
            w.aw_done |= input.s_axil_awvalid && out.s_axil_awready;
            w.w_done |= input.s_axil_wvalid && out.s_axil_wready;
        }
        if out.s_axil_bvalid && input.s_axil_bready {
            match self.write.take() {
                Some(w) => {
                    let result = WriteResult {
                        addr: w.addr,
                        data: w.data,
                        resp: AxiResp::from(out.s_axil_bresp),
                        issued: w.issued,
                        completed,
                    };
                    log::trace!("originator: {result:x?}");
                    self.write_outcome = Some(Ok(result));
                }
                None => log::warn!("originator: unexpected write response"),
            }
        }

        if let Some(r) = &mut self.read {
            r.ar_done |= input.s_axil_arvalid && out.s_axil_arready;
        }
        if out.s_axil_rvalid && input.s_axil_rready {
            match self.read.take() {
                Some(r) => {
                    let result = ReadResult {
                        addr: r.addr,
                        data: out.s_axil_rdata,
                        resp: AxiResp::from(out.s_axil_rresp),
                        issued: r.issued,
                        completed,
                    };
                    log::trace!("originator: {result:x?}");
                    self.read_outcome = Some(Ok(result));
                }
                None => log::warn!("originator: unexpected read response"),
            }
        }

        self.bready = self.ready.roll();
        self.rready = self.ready.roll();
    }

    /// Drop in-flight requests; their outcome becomes `ModelError::Aborted`.
    pub fn reset(&mut self) {
        if let Some(w) = self.write.take() {
            log::debug!("originator: write {:#010x} aborted by reset", w.addr);
            self.write_outcome = Some(Err(ModelError::Aborted));
        }
        if let Some(r) = self.read.take() {
            log::debug!("originator: read {:#010x} aborted by reset", r.addr);
            self.read_outcome = Some(Err(ModelError::Aborted));
        }
    }

    pub fn is_idle(&self) -> bool {
        self.write.is_none() && self.read.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holds_request_until_accepted() {
        let mut orig = Originator::new(ReadyPolicy::Always, 0);
        orig.start_write(0x10, 0x20, 3).unwrap();
        assert_eq!(orig.start_write(0x14, 0, 3), Err(ModelError::PathBusy));

        let mut input = SigIn::default();
        orig.drive(&mut input);
        assert!(input.s_axil_awvalid);
        assert!(input.s_axil_wvalid);
        assert!(input.s_axil_bready);
        assert_eq!(orig.write_channel(), Some(AxiChannel::WriteAddr));

        orig.clock(&input, &SigOut::default(), 4);
        orig.drive(&mut input);
        assert!(input.s_axil_awvalid);

        let out = SigOut {
            s_axil_awready: true,
            ..Default::default()
        };
        orig.clock(&input, &out, 5);
        orig.drive(&mut input);
        assert!(!input.s_axil_awvalid);
        assert!(input.s_axil_wvalid);
        assert_eq!(orig.write_channel(), Some(AxiChannel::WriteData));

        let out = SigOut {
            s_axil_wready: true,
            ..Default::default()
        };
        orig.clock(&input, &out, 6);
        orig.drive(&mut input);
        assert!(!input.s_axil_wvalid);
        assert_eq!(orig.write_channel(), Some(AxiChannel::WriteResp));

        let out = SigOut {
            s_axil_bvalid: true,
            s_axil_bresp: 3,
            ..Default::default()
        };
        orig.clock(&input, &out, 7);
        let result = orig.take_write_result().unwrap().unwrap();
        assert_eq!(result.resp, AxiResp::DecErr);
        assert_eq!(result.latency(), 4);
        assert!(orig.is_idle());
        assert!(orig.take_write_result().is_none());
    }

    #[test]
    fn test_read_result() {
        let mut orig = Originator::new(ReadyPolicy::Always, 0);
        orig.start_read(0x40, 0).unwrap();
        let mut input = SigIn::default();
        orig.drive(&mut input);
        assert_eq!(input.s_axil_araddr, 0x40);
        let out = SigOut {
            s_axil_arready: true,
            ..Default::default()
        };
        orig.clock(&input, &out, 1);
        assert_eq!(orig.read_channel(), Some(AxiChannel::ReadData));
        orig.drive(&mut input);
        let out = SigOut {
            s_axil_rvalid: true,
            s_axil_rdata: 0xcafe,
            s_axil_rresp: 1,
            ..Default::default()
        };
        orig.clock(&input, &out, 2);
        let result = orig.take_read_result().unwrap().unwrap();
        assert_eq!(result.data, 0xcafe);
        assert_eq!(result.resp, AxiResp::ExOkay);
    }

    #[test]
    fn test_never_ready_holds_response() {
        let mut orig = Originator::new(ReadyPolicy::Never, 0);
        orig.start_read(0x40, 0).unwrap();
        let mut input = SigIn::default();
        orig.drive(&mut input);
        assert!(!input.s_axil_rready);
        let out = SigOut {
            s_axil_arready: true,
            s_axil_rvalid: true,
            ..Default::default()
        };
        orig.clock(&input, &out, 1);
        assert!(orig.take_read_result().is_none());
    }

    #[test]
    fn test_reset_aborts() {
        let mut orig = Originator::new(ReadyPolicy::Always, 0);
        orig.start_write(0x10, 0x20, 0).unwrap();
        orig.start_read(0x10, 0).unwrap();
        orig.reset();
        assert!(orig.is_idle());
        assert_eq!(orig.take_write_result(), Some(Err(ModelError::Aborted)));
        assert_eq!(orig.take_read_result(), Some(Err(ModelError::Aborted)));
        orig.reset();
        assert_eq!(orig.take_write_result(), None);
    }
}
