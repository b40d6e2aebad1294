/*++

Licensed under the Apache-2.0 license.

File Name:

    trace.rs

Abstract:

    File contains a Value Change Dump writer for the adapter ports.

--*/

use crate::{SigIn, SigOut};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Clock period in nanoseconds (100 MHz)
pub const CLOCK_PERIOD_NS: u64 = 10;

macro_rules! vcd_signals {
    (in: [$($iname:ident : $iw:literal),* $(,)?], out: [$($oname:ident : $ow:literal),* $(,)?]) => {
        const SIGNALS: &[(&str, u32)] = &[
            $((stringify!($iname), $iw),)*
            $((stringify!($oname), $ow),)*
        ];

        fn sample(input: &SigIn, out: &SigOut) -> Vec<u64> {
            vec![$(input.$iname as u64,)* $(out.$oname as u64,)*]
        }
    };
}

vcd_signals! {
    in: [
        rstn: 1,
        s_axil_awaddr: 32, s_axil_awvalid: 1,
        s_axil_wdata: 32, s_axil_wvalid: 1,
        s_axil_bready: 1,
        s_axil_araddr: 32, s_axil_arvalid: 1,
        s_axil_rready: 1,
        m_axil_awready: 1,
        m_axil_wready: 1,
        m_axil_bresp: 2, m_axil_bvalid: 1,
        m_axil_arready: 1,
        m_axil_rdata: 32, m_axil_rresp: 2, m_axil_rvalid: 1,
    ],
    out: [
        s_axil_awready: 1,
        s_axil_wready: 1,
        s_axil_bresp: 2, s_axil_bvalid: 1,
        s_axil_arready: 1,
        s_axil_rdata: 32, s_axil_rresp: 2, s_axil_rvalid: 1,
        m_axil_awaddr: 32, m_axil_awvalid: 1,
        m_axil_wdata: 32, m_axil_wvalid: 1,
        m_axil_bready: 1,
        m_axil_araddr: 32, m_axil_arvalid: 1,
        m_axil_rready: 1,
    ]
}

const CLK_ID: char = '!';

fn signal_id(index: usize) -> char {
    // Printable identifiers start after the clock's
    char::from(b'"' + index as u8)
}

pub struct VcdTrace {
    out: BufWriter<File>,
    last: Option<Vec<u64>>,
}

impl VcdTrace {
    /// Creates `path` and writes the VCD header.
    pub fn create(path: &Path) -> io::Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "$timescale 1ns $end")?;
        writeln!(out, "$scope module axil_adapter $end")?;
        writeln!(out, "$var wire 1 {CLK_ID} clk $end")?;
        for (i, (name, width)) in SIGNALS.iter().enumerate() {
            writeln!(out, "$var wire {width} {} {name} $end", signal_id(i))?;
        }
        writeln!(out, "$upscope $end")?;
        writeln!(out, "$enddefinitions $end")?;
        Ok(Self { out, last: None })
    }

    /// Record the signals held during `cycle`. The rising edge that samples
    /// them is placed half a period later.
    pub fn record(&mut self, cycle: u64, input: &SigIn, output: &SigOut) -> io::Result<()> {
        let t = cycle * CLOCK_PERIOD_NS;
        let values = sample(input, output);
        writeln!(self.out, "#{t}")?;
        writeln!(self.out, "0{CLK_ID}")?;
        for (i, (&val, &(_, width))) in values.iter().zip(SIGNALS).enumerate() {
            if self.last.as_ref().is_some_and(|last| last[i] == val) {
                continue;
            }
            if width == 1 {
                writeln!(self.out, "{val}{}", signal_id(i))?;
            } else {
                writeln!(self.out, "b{val:b} {}", signal_id(i))?;
            }
        }
        writeln!(self.out, "#{}", t + CLOCK_PERIOD_NS / 2)?;
        writeln!(self.out, "1{CLK_ID}")?;
        self.last = Some(values);
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.out.flush()
    }
}
