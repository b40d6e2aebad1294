// Licensed under the Apache-2.0 license

use axil_adapter::{SigIn, SigOut};
use axil_emu_bus::{ActionHandle, Bus, BusError, Timer};
use axil_emu_types::{AxiAddr, AxiData, AxiResp, AxiRespBits};

use crate::policy::{ReadyGen, ReadyPolicy};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ResponderStats {
    pub writes: u64,
    pub reads: u64,
    /// Responses other than OKAY/EXOKAY
    pub error_responses: u64,
}

/// A response waiting out its latency, then driven until accepted.
struct Response<T> {
    payload: T,
    valid: bool,
    action: Option<ActionHandle>,
}

/// Upstream bus-functional model. Serves one write and one read at a time
/// from `bus`.
pub struct Responder<TBus: Bus> {
    bus: TBus,
    timer: Timer,
    latency: u64,
    forced: Option<AxiResp>,
    ready: ReadyGen,
    awready: bool,
    wready: bool,
    arready: bool,

    aw: Option<AxiAddr>,
    w: Option<AxiData>,
    b: Option<Response<AxiRespBits>>,
    r: Option<Response<(AxiData, AxiRespBits)>>,

    stats: ResponderStats,
}

impl<TBus: Bus> Responder<TBus> {
    pub fn new(bus: TBus, timer: Timer, latency: u64, policy: ReadyPolicy, seed: u64) -> Self {
        let mut ready = ReadyGen::new(policy, seed);
        Self {
            bus,
            timer,
            latency,
            forced: None,
            awready: ready.roll(),
            wready: ready.roll(),
            arready: ready.roll(),
            ready,
            aw: None,
            w: None,
            b: None,
            r: None,
            stats: ResponderStats::default(),
        }
    }

    /// Respond with `resp` instead of the bus result. Accesses are still
    /// performed.
    pub fn set_forced_response(&mut self, resp: Option<AxiResp>) {
        self.forced = resp;
    }

    /// Applies to requests captured from now on.
    pub fn set_latency(&mut self, latency: u64) {
        self.latency = latency;
    }

    pub fn stats(&self) -> ResponderStats {
        self.stats
    }

    pub fn is_idle(&self) -> bool {
        self.aw.is_none() && self.w.is_none() && self.b.is_none() && self.r.is_none()
    }

    pub fn drive(&self, input: &mut SigIn) {
        let write_free = self.b.is_none();
        input.m_axil_awready = self.awready && write_free && self.aw.is_none();
        input.m_axil_wready = self.wready && write_free && self.w.is_none();
        input.m_axil_arready = self.arready && self.r.is_none();

        input.m_axil_bvalid = self.b.as_ref().is_some_and(|b| b.valid);
        input.m_axil_bresp = self.b.as_ref().map_or(0, |b| b.payload);
        input.m_axil_rvalid = self.r.as_ref().is_some_and(|r| r.valid);
        let (rdata, rresp) = self.r.as_ref().map_or((0, 0), |r| r.payload);
        input.m_axil_rdata = rdata;
        input.m_axil_rresp = rresp;
    }

    /// Sample one rising edge.
    pub fn clock(&mut self, input: &SigIn, out: &SigOut) {
        if out.m_axil_awvalid && input.m_axil_awready {
            self.aw = Some(out.m_axil_awaddr);
        }
        if out.m_axil_wvalid && input.m_axil_wready {
            self.w = Some(out.m_axil_wdata);
        }
        if input.m_axil_bvalid && out.m_axil_bready {
            self.b = None;
        }
        if input.m_axil_rvalid && out.m_axil_rready {
            self.r = None;
        }

        // Writes are served before a read captured on the same edge
        if let (Some(addr), Some(data)) = (self.aw, self.w) {
            self.aw = None;
            self.w = None;
            let result = self.bus.write(addr, data);
            let resp = self.respond(result.err());
            log::trace!("responder: write {addr:#010x} <- {data:#010x}: {resp}");
            self.stats.writes += 1;
            self.b = Some(self.schedule(resp.into()));
        }
        if out.m_axil_arvalid && input.m_axil_arready {
            let addr = out.m_axil_araddr;
            let result = self.bus.read(addr);
            let resp = self.respond(result.err());
            let data = result.unwrap_or(0);
            log::trace!("responder: read {addr:#010x} -> {data:#010x}: {resp}");
            self.stats.reads += 1;
            self.r = Some(self.schedule((data, resp.into())));
        }

        self.awready = self.ready.roll();
        self.wready = self.ready.roll();
        self.arready = self.ready.roll();
    }

    /// Called when a scheduled response may have come due.
    pub fn poll(&mut self) {
        let timer = &self.timer;
        if let Some(b) = &mut self.b {
            b.valid |= timer.fired(&mut b.action);
        }
        if let Some(r) = &mut self.r {
            r.valid |= timer.fired(&mut r.action);
        }
        self.bus.poll();
    }

    pub fn reset(&mut self) {
        self.aw = None;
        self.w = None;
        if let Some(action) = self.b.take().and_then(|b| b.action) {
            self.timer.cancel(action);
        }
        if let Some(action) = self.r.take().and_then(|r| r.action) {
            self.timer.cancel(action);
        }
    }

    fn respond(&mut self, err: Option<BusError>) -> AxiResp {
        let resp = self
            .forced
            .unwrap_or_else(|| err.map_or(AxiResp::Okay, AxiResp::from));
        if resp.is_error() {
            self.stats.error_responses += 1;
        }
        resp
    }

    fn schedule<T>(&self, payload: T) -> Response<T> {
        Response {
            payload,
            valid: false,
            // Fires at the end of the current edge when latency is 0
            action: Some(self.timer.schedule_poll_in(self.latency.saturating_add(1))),
        }
    }
}

/// Backdoor access to the memory behind the responder.
impl<TBus: Bus> Bus for Responder<TBus> {
    fn read(&mut self, addr: AxiAddr) -> Result<AxiData, BusError> {
        self.bus.read(addr)
    }

    fn write(&mut self, addr: AxiAddr, val: AxiData) -> Result<(), BusError> {
        self.bus.write(addr, val)
    }

    fn poll(&mut self) {
        Responder::poll(self)
    }

    fn warm_reset(&mut self) {
        self.reset();
        self.bus.warm_reset();
    }
}
