// Licensed under the Apache-2.0 license

use std::collections::HashMap;
use std::fmt;

use axil_adapter::{SigIn, SigOut};
use axil_emu_types::AxiChannel;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Port {
    /// `s_axil_*`, facing the originator
    Downstream,
    /// `m_axil_*`, facing the responder
    Upstream,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Downstream => write!(f, "s_axil"),
            Port::Upstream => write!(f, "m_axil"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ViolationKind {
    /// Valid deasserted before the transfer was accepted
    ValidDropped,
    /// Payload changed while valid was held
    PayloadChanged,
    /// A response was offered downstream before its request was accepted
    ResponseBeforeRequest,
    /// A second request was forwarded upstream before the first completed
    OutstandingExceeded,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Violation {
    pub cycle: u64,
    pub port: Port,
    pub channel: AxiChannel,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ViolationKind::ValidDropped => "valid dropped before acceptance",
            ViolationKind::PayloadChanged => "payload changed while pending",
            ViolationKind::ResponseBeforeRequest => "response before request accepted",
            ViolationKind::OutstandingExceeded => "more than one transaction outstanding",
        };
        write!(
            f,
            "cycle {}: {}_{} {what}",
            self.cycle,
            self.port,
            self.channel.prefix()
        )
    }
}

#[derive(Clone, Copy)]
struct Sample {
    port: Port,
    channel: AxiChannel,
    valid: bool,
    ready: bool,
    payload: u64,
}

impl Sample {
    fn accepted(&self) -> bool {
        self.valid && self.ready
    }
}

fn samples(i: &SigIn, o: &SigOut) -> [Sample; 10] {
    use AxiChannel::*;
    use Port::*;
    let s = |port, channel, valid, ready, payload: u64| Sample {
        port,
        channel,
        valid,
        ready,
        payload,
    };
    [
        s(Downstream, WriteAddr, i.s_axil_awvalid, o.s_axil_awready, i.s_axil_awaddr.into()),
        s(Downstream, WriteData, i.s_axil_wvalid, o.s_axil_wready, i.s_axil_wdata.into()),
        s(Downstream, WriteResp, o.s_axil_bvalid, i.s_axil_bready, o.s_axil_bresp.into()),
        s(Downstream, ReadAddr, i.s_axil_arvalid, o.s_axil_arready, i.s_axil_araddr.into()),
        s(
            Downstream,
            ReadData,
            o.s_axil_rvalid,
            i.s_axil_rready,
            u64::from(o.s_axil_rdata) << 8 | u64::from(o.s_axil_rresp),
        ),
        s(Upstream, WriteAddr, o.m_axil_awvalid, i.m_axil_awready, o.m_axil_awaddr.into()),
        s(Upstream, WriteData, o.m_axil_wvalid, i.m_axil_wready, o.m_axil_wdata.into()),
        s(Upstream, WriteResp, i.m_axil_bvalid, o.m_axil_bready, i.m_axil_bresp.into()),
        s(Upstream, ReadAddr, o.m_axil_arvalid, i.m_axil_arready, o.m_axil_araddr.into()),
        s(
            Upstream,
            ReadData,
            i.m_axil_rvalid,
            o.m_axil_rready,
            u64::from(i.m_axil_rdata) << 8 | u64::from(i.m_axil_rresp),
        ),
    ]
}

/// Checks the handshake rules on both ports, and the adapter's ordering
/// obligations, one edge at a time.
#[derive(Default)]
pub struct ProtocolMonitor {
    /// Payload of every transfer held valid but not accepted on the last edge
    pending: HashMap<(Port, AxiChannel), u64>,

    dn_aw_accepted: bool,
    dn_w_accepted: bool,
    dn_ar_accepted: bool,
    b_checked: bool,
    r_checked: bool,

    /// Upstream request forwarded and its downstream response not yet accepted
    write_in_flight: bool,
    read_in_flight: bool,

    violations: Vec<Violation>,
}

impl ProtocolMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn reset(&mut self) {
        let violations = std::mem::take(&mut self.violations);
        *self = Self {
            violations,
            ..Default::default()
        };
    }

    /// Check the signals held across the rising edge that ends `cycle`.
    pub fn observe(&mut self, cycle: u64, input: &SigIn, out: &SigOut) {
        if !input.rstn {
            self.reset();
            return;
        }
        let samples = samples(input, out);
        let mut held = [false; 10];

        for (s, held) in samples.iter().zip(held.iter_mut()) {
            let key = (s.port, s.channel);
            if let Some(prev) = self.pending.remove(&key) {
                *held = true;
                if !s.valid {
                    self.flag(cycle, s, ViolationKind::ValidDropped);
                } else if s.payload != prev {
                    self.flag(cycle, s, ViolationKind::PayloadChanged);
                }
            }
            if s.valid && !s.ready {
                self.pending.insert(key, s.payload);
            }
        }

        let [dn_aw, dn_w, dn_b, dn_ar, dn_r, up_aw, _, _, up_ar, _] = samples;
        let up_aw_new = up_aw.valid && !held[5];
        let up_ar_new = up_ar.valid && !held[8];

        if dn_b.valid && !self.b_checked {
            self.b_checked = true;
            if !(self.dn_aw_accepted && self.dn_w_accepted) {
                self.flag(cycle, &dn_b, ViolationKind::ResponseBeforeRequest);
            }
        }
        if dn_r.valid && !self.r_checked {
            self.r_checked = true;
            if !self.dn_ar_accepted {
                self.flag(cycle, &dn_r, ViolationKind::ResponseBeforeRequest);
            }
        }
        if up_aw_new && self.write_in_flight {
            self.flag(cycle, &up_aw, ViolationKind::OutstandingExceeded);
        }
        if up_ar_new && self.read_in_flight {
            self.flag(cycle, &up_ar, ViolationKind::OutstandingExceeded);
        }

        self.dn_aw_accepted |= dn_aw.accepted();
        self.dn_w_accepted |= dn_w.accepted();
        self.dn_ar_accepted |= dn_ar.accepted();
        self.write_in_flight |= up_aw.accepted();
        self.read_in_flight |= up_ar.accepted();
        if dn_b.accepted() {
            self.dn_aw_accepted = false;
            self.dn_w_accepted = false;
            self.b_checked = false;
            self.write_in_flight = false;
        }
        if dn_r.accepted() {
            self.dn_ar_accepted = false;
            self.r_checked = false;
            self.read_in_flight = false;
        }
    }

    fn flag(&mut self, cycle: u64, s: &Sample, kind: ViolationKind) {
        let violation = Violation {
            cycle,
            port: s.port,
            channel: s.channel,
            kind,
        };
        log::warn!("{violation}");
        self.violations.push(violation);
    }
}
