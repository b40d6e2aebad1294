/*++

Licensed under the Apache-2.0 license.

File Name:

    write_path.rs

Abstract:

    File contains the write path coordinator. It forwards one AW/W pair
    upstream, collects the B response and returns it downstream.

--*/

use crate::handshake::{Sink, Source};
use crate::{SigIn, SigOut};
use axil_emu_types::{AxiAddr, AxiData, AxiRespBits, AXI_RESP_MASK};
use smlang::statemachine;

statemachine! {
    derive_states: [Clone, Copy, Debug],
    derive_events: [Clone, Copy, Debug],
    transitions: {
        // both downstream valids seen; AW and W are driven upstream
        *Idle + Launch / launch = AwaitUpstreamAw,

        // AW and W are accepted upstream in either order or together
        AwaitUpstreamAw + AddrForwarded = AwaitUpstreamW,
        AwaitUpstreamAw + Forwarded = AwaitUpstreamB,
        AwaitUpstreamW + Forwarded = AwaitUpstreamB,

        AwaitUpstreamB + Response / forward_response = AwaitDownstreamBAccept,
        AwaitDownstreamBAccept + Retire / retire = Idle,
    }
}

/// State machine extended variables.
#[derive(Default)]
pub(crate) struct Context {
    addr: AxiAddr,
    data: AxiData,
    resp: AxiRespBits,

    /// Upstream AW and W, downstream B
    aw: Source<AxiAddr>,
    w: Source<AxiData>,
    b: Source<AxiRespBits>,

    /// Downstream AW and W acceptance, upstream B acceptance
    aw_dn: Sink,
    w_dn: Sink,
    b_up: Sink,

    addr_forwarded: bool,
    data_forwarded: bool,
}

impl StateMachineContext for Context {
    fn launch(&mut self) -> Result<(), ()> {
        self.aw.offer(self.addr);
        self.w.offer(self.data);
        Ok(())
    }

    fn forward_response(&mut self) -> Result<(), ()> {
        self.b.offer(self.resp);
        Ok(())
    }

    fn retire(&mut self) -> Result<(), ()> {
        self.addr_forwarded = false;
        self.data_forwarded = false;
        self.aw_dn.release();
        self.w_dn.release();
        self.b_up.release();
        Ok(())
    }
}

pub struct WritePath {
    state_machine: StateMachine<Context>,
}

impl Default for WritePath {
    fn default() -> Self {
        Self::new()
    }
}

impl WritePath {
    pub fn new() -> Self {
        Self {
            state_machine: StateMachine::new(Context::default()),
        }
    }

    pub fn state(&self) -> States {
        *self.state_machine.state()
    }

    /// Drop any in-flight write and return to `Idle`.
    pub fn reset(&mut self) {
        self.state_machine = StateMachine::new(Context::default());
    }

    /// Drive this path's outputs for the current tick.
    pub fn eval(&self, enabled: bool, input: &SigIn, out: &mut SigOut) {
        let ctx = &self.state_machine.context;

        out.m_axil_awaddr = ctx.aw.payload();
        out.m_axil_awvalid = enabled && ctx.aw.valid();
        out.m_axil_wdata = ctx.w.payload();
        out.m_axil_wvalid = enabled && ctx.w.valid();
        out.m_axil_bready = enabled && matches!(self.state(), States::AwaitUpstreamB);

        out.s_axil_awready = out.m_axil_awvalid && input.m_axil_awready;
        out.s_axil_wready = out.m_axil_wvalid && input.m_axil_wready;
        out.s_axil_bresp = ctx.b.payload();
        out.s_axil_bvalid = enabled && ctx.b.valid();
    }

    /// Advance one rising edge. `out` must be the result of [`WritePath::eval`]
    /// for the same `input`.
    pub fn clock(&mut self, input: &SigIn, out: &SigOut) {
        let event = match self.state() {
            States::Idle => self.clock_idle(input),
            States::AwaitUpstreamAw | States::AwaitUpstreamW => self.clock_forwarding(input, out),
            States::AwaitUpstreamB => self.clock_response(input, out),
            States::AwaitDownstreamBAccept => {
                let ctx = &mut self.state_machine.context;
                ctx.b.clock(input.s_axil_bready).map(|resp| {
                    log::trace!("B resp {resp:#x} accepted downstream");
                    Events::Retire
                })
            }
        };
        if let Some(event) = event {
            let from = self.state();
            if self.state_machine.process_event(event).is_err() {
                log::warn!("write path: event {event:?} rejected in {from:?}");
                return;
            }
            log::debug!("write path: {from:?} -> {:?}", self.state());
        }
    }

    fn clock_idle(&mut self, input: &SigIn) -> Option<Events> {
        if !(input.s_axil_awvalid && input.s_axil_wvalid) {
            return None;
        }
        let ctx = &mut self.state_machine.context;
        ctx.addr = input.s_axil_awaddr;
        ctx.data = input.s_axil_wdata;
        log::trace!(
            "write {:#010x} <- {:#010x} latched",
            input.s_axil_awaddr,
            input.s_axil_wdata
        );
        Some(Events::Launch)
    }

    fn clock_forwarding(&mut self, input: &SigIn, out: &SigOut) -> Option<Events> {
        let ctx = &mut self.state_machine.context;

        if let Some(addr) = ctx.aw.clock(input.m_axil_awready) {
            log::trace!("AW {addr:#010x} accepted upstream");
            ctx.addr_forwarded = true;
            match ctx
                .aw_dn
                .clock(out.s_axil_awready, input.s_axil_awvalid, input.s_axil_awaddr)
            {
                Some(dn) if dn != addr => {
                    log::warn!("downstream AW changed while pending: {addr:#010x} -> {dn:#010x}")
                }
                Some(_) => {}
                None => log::warn!("downstream AW withdrawn before acceptance"),
            }
        }
        if let Some(data) = ctx.w.clock(input.m_axil_wready) {
            log::trace!("W {data:#010x} accepted upstream");
            ctx.data_forwarded = true;
            match ctx
                .w_dn
                .clock(out.s_axil_wready, input.s_axil_wvalid, input.s_axil_wdata)
            {
                Some(dn) if dn != data => {
                    log::warn!("downstream W changed while pending: {data:#010x} -> {dn:#010x}")
                }
                Some(_) => {}
                None => log::warn!("downstream W withdrawn before acceptance"),
            }
        }

        match (ctx.addr_forwarded, ctx.data_forwarded) {
            (true, true) => Some(Events::Forwarded),
            (true, false) if matches!(self.state(), States::AwaitUpstreamAw) => {
                Some(Events::AddrForwarded)
            }
            _ => None,
        }
    }

    fn clock_response(&mut self, input: &SigIn, out: &SigOut) -> Option<Events> {
        let ctx = &mut self.state_machine.context;
        let resp = ctx
            .b_up
            .clock(out.m_axil_bready, input.m_axil_bvalid, input.m_axil_bresp)?;
        log::trace!("B resp {resp:#x} accepted upstream");
        ctx.resp = resp & AXI_RESP_MASK;
        Some(Events::Response)
    }
}
