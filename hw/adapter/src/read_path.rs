/*++

Licensed under the Apache-2.0 license.

File Name:

    read_path.rs

Abstract:

    File contains the read path coordinator. It forwards one AR upstream and
    returns the R data and response downstream.

--*/

use crate::handshake::{Sink, Source};
use crate::{SigIn, SigOut};
use axil_emu_types::{AxiAddr, AxiData, AxiRespBits, AXI_RESP_MASK};
use smlang::statemachine;

statemachine! {
    derive_states: [Clone, Copy, Debug],
    derive_events: [Clone, Copy, Debug],
    transitions: {
        *Idle + Launch / launch = AwaitUpstreamArAccept,
        AwaitUpstreamArAccept + AddrForwarded = AwaitUpstreamR,
        AwaitUpstreamR + Data / forward_data = AwaitDownstreamRAccept,
        AwaitDownstreamRAccept + Retire / retire = Idle,
    }
}

/// Read data channel payload.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReadData {
    pub data: AxiData,
    pub resp: AxiRespBits,
}

/// State machine extended variables.
#[derive(Default)]
pub(crate) struct Context {
    addr: AxiAddr,
    rdata: ReadData,

    ar: Source<AxiAddr>,
    r: Source<ReadData>,

    ar_dn: Sink,
    r_up: Sink,
}

impl StateMachineContext for Context {
    fn launch(&mut self) -> Result<(), ()> {
        self.ar.offer(self.addr);
        Ok(())
    }

    fn forward_data(&mut self) -> Result<(), ()> {
        self.r.offer(self.rdata);
        Ok(())
    }

    fn retire(&mut self) -> Result<(), ()> {
        self.ar_dn.release();
        self.r_up.release();
        Ok(())
    }
}

pub struct ReadPath {
    state_machine: StateMachine<Context>,
}

impl Default for ReadPath {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadPath {
    pub fn new() -> Self {
        Self {
            state_machine: StateMachine::new(Context::default()),
        }
    }

    pub fn state(&self) -> States {
        *self.state_machine.state()
    }

    pub fn reset(&mut self) {
        self.state_machine = StateMachine::new(Context::default());
    }

    pub fn eval(&self, enabled: bool, input: &SigIn, out: &mut SigOut) {
        let ctx = &self.state_machine.context;

        out.m_axil_araddr = ctx.ar.payload();
        out.m_axil_arvalid = enabled && ctx.ar.valid();
        out.m_axil_rready = enabled && matches!(self.state(), States::AwaitUpstreamR);

        out.s_axil_arready = out.m_axil_arvalid && input.m_axil_arready;
        out.s_axil_rdata = ctx.r.payload().data;
        out.s_axil_rresp = ctx.r.payload().resp;
        out.s_axil_rvalid = enabled && ctx.r.valid();
    }

    pub fn clock(&mut self, input: &SigIn, out: &SigOut) {
        let state = self.state();
        let ctx = &mut self.state_machine.context;
        let event = match state {
            States::Idle if input.s_axil_arvalid => {
                ctx.addr = input.s_axil_araddr;
                log::trace!("read {:#010x} latched", input.s_axil_araddr);
                Some(Events::Launch)
            }
            States::Idle => None,
            States::AwaitUpstreamArAccept => {
                ctx.ar.clock(input.m_axil_arready).map(|addr| {
                    log::trace!("AR {addr:#010x} accepted upstream");
                    match ctx.ar_dn.clock(
                        out.s_axil_arready,
                        input.s_axil_arvalid,
                        input.s_axil_araddr,
                    ) {
                        Some(dn) if dn != addr => log::warn!(
                            "downstream AR changed while pending: {addr:#010x} -> {dn:#010x}"
                        ),
                        Some(_) => {}
                        None => log::warn!("downstream AR withdrawn before acceptance"),
                    }
                    Events::AddrForwarded
                })
            }
            States::AwaitUpstreamR => {
                let beat = ReadData {
                    data: input.m_axil_rdata,
                    resp: input.m_axil_rresp & AXI_RESP_MASK,
                };
                ctx.r_up
                    .clock(out.m_axil_rready, input.m_axil_rvalid, beat)
                    .map(|beat| {
                        log::trace!("R {:#010x}/{:#x} accepted upstream", beat.data, beat.resp);
                        ctx.rdata = beat;
                        Events::Data
                    })
            }
            States::AwaitDownstreamRAccept => ctx
                .r
                .clock(input.s_axil_rready)
                .map(|_| Events::Retire),
        };
        if let Some(event) = event {
            if self.state_machine.process_event(event).is_err() {
                log::warn!("read path: event {event:?} rejected in {state:?}");
                return;
            }
            log::debug!("read path: {state:?} -> {:?}", self.state());
        }
    }
}
