// Licensed under the Apache-2.0 license.

use std::fmt;

/// One of the five independent valid/ready channels of an AXI4-Lite port.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum AxiChannel {
    WriteAddr,
    WriteData,
    WriteResp,
    ReadAddr,
    ReadData,
}

impl AxiChannel {
    pub const ALL: [AxiChannel; 5] = [
        AxiChannel::WriteAddr,
        AxiChannel::WriteData,
        AxiChannel::WriteResp,
        AxiChannel::ReadAddr,
        AxiChannel::ReadData,
    ];

    /// Signal name prefix, e.g. `aw` for the `awaddr`/`awvalid`/`awready` group.
    pub fn prefix(self) -> &'static str {
        match self {
            AxiChannel::WriteAddr => "aw",
            AxiChannel::WriteData => "w",
            AxiChannel::WriteResp => "b",
            AxiChannel::ReadAddr => "ar",
            AxiChannel::ReadData => "r",
        }
    }

    /// True for the channels that flow from the responder back to the originator.
    pub fn is_response(self) -> bool {
        matches!(self, AxiChannel::WriteResp | AxiChannel::ReadData)
    }
}

impl fmt::Display for AxiChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let names: Vec<String> = AxiChannel::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, ["AW", "W", "B", "AR", "R"]);
    }

    #[test]
    fn test_is_response() {
        assert!(AxiChannel::WriteResp.is_response());
        assert!(AxiChannel::ReadData.is_response());
        assert!(!AxiChannel::WriteAddr.is_response());
        assert!(!AxiChannel::WriteData.is_response());
        assert!(!AxiChannel::ReadAddr.is_response());
    }
}
