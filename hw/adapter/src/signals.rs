// Licensed under the Apache-2.0 license

use axil_emu_types::{AxiAddr, AxiData, AxiRespBits};

/// Every signal driven into the adapter for one clock period.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SigIn {
    /// Synchronous active-low reset
    pub rstn: bool,

    pub s_axil_awaddr: AxiAddr,
    pub s_axil_awvalid: bool,
    pub s_axil_wdata: AxiData,
    pub s_axil_wvalid: bool,
    pub s_axil_bready: bool,
    pub s_axil_araddr: AxiAddr,
    pub s_axil_arvalid: bool,
    pub s_axil_rready: bool,

    pub m_axil_awready: bool,
    pub m_axil_wready: bool,
    pub m_axil_bresp: AxiRespBits,
    pub m_axil_bvalid: bool,
    pub m_axil_arready: bool,
    pub m_axil_rdata: AxiData,
    pub m_axil_rresp: AxiRespBits,
    pub m_axil_rvalid: bool,
}

/// Every signal the adapter drives.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SigOut {
    pub s_axil_awready: bool,
    pub s_axil_wready: bool,
    pub s_axil_bresp: AxiRespBits,
    pub s_axil_bvalid: bool,
    pub s_axil_arready: bool,
    pub s_axil_rdata: AxiData,
    pub s_axil_rresp: AxiRespBits,
    pub s_axil_rvalid: bool,

    pub m_axil_awaddr: AxiAddr,
    pub m_axil_awvalid: bool,
    pub m_axil_wdata: AxiData,
    pub m_axil_wvalid: bool,
    pub m_axil_bready: bool,
    pub m_axil_araddr: AxiAddr,
    pub m_axil_arvalid: bool,
    pub m_axil_rready: bool,
}

impl SigOut {
    /// True if any valid or ready output is asserted.
    pub fn any_handshake_asserted(&self) -> bool {
        self.s_axil_awready
            || self.s_axil_wready
            || self.s_axil_bvalid
            || self.s_axil_arready
            || self.s_axil_rvalid
            || self.m_axil_awvalid
            || self.m_axil_wvalid
            || self.m_axil_bready
            || self.m_axil_arvalid
            || self.m_axil_rready
    }
}
