/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the AXI4-Lite emulator types library.

--*/

mod channel;
mod macros;

pub use crate::channel::AxiChannel;

/// AXI4-Lite address width
pub type AxiAddr = u32;

/// AXI4-Lite data width. Only 32-bit transfers are supported.
pub type AxiData = u32;

/// Raw BRESP/RRESP field as carried on the wires.
pub type AxiRespBits = u8;

/// Mask of the bits that exist on a BRESP/RRESP wire.
pub const AXI_RESP_MASK: AxiRespBits = 0b11;

wire_enum!(
    /// AXI response code
    #[derive(Debug, Default, Eq, PartialEq, Copy, Clone)]
    pub AxiResp;
    AxiRespBits;
    {
        /// Normal access success
        #[default]
        Okay = 0 => "OKAY",

        /// Exclusive access success
        ExOkay = 1 => "EXOKAY",

        /// The addressed device returned an error
        SlvErr = 2 => "SLVERR",

        /// No device exists at the address
        DecErr = 3 => "DECERR",
    };
    Invalid
);

impl AxiResp {
    /// Returns true for SLVERR and DECERR.
    pub fn is_error(self) -> bool {
        matches!(self, AxiResp::SlvErr | AxiResp::DecErr)
    }
}
