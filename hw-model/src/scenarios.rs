// Licensed under the Apache-2.0 license

//! Reference traffic for the adapter. Every scenario addresses the RAM window
//! relative to its base and fails on the first protocol violation.

use std::collections::HashMap;

use axil_emu_types::{AxiAddr, AxiChannel, AxiData, AxiResp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{AdapterModel, ModelError};

/// Edges from presenting a write to accepting its response, with both sides
/// always ready and no responder latency.
pub const BACK_TO_BACK_LATENCY: u64 = 4;

/// Stress reads and writes are confined to this many words so that they
/// collide often.
const STRESS_WORDS: u32 = 64;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScenarioReport {
    pub name: &'static str,
    pub transactions: u64,
    pub cycles: u64,
}

fn expect_okay(addr: AxiAddr, resp: AxiResp) -> Result<(), ModelError> {
    match resp {
        AxiResp::Okay => Ok(()),
        resp => Err(ModelError::InvalidResponse { addr, resp }),
    }
}

fn expect_data(addr: AxiAddr, expected: AxiData, actual: AxiData) -> Result<(), ModelError> {
    if actual != expected {
        return Err(ModelError::ReadbackMismatch {
            addr,
            expected,
            actual,
        });
    }
    Ok(())
}

fn finish(
    model: &AdapterModel,
    name: &'static str,
    start: u64,
    transactions: u64,
) -> Result<ScenarioReport, ModelError> {
    model.check_protocol()?;
    let report = ScenarioReport {
        name,
        transactions,
        cycles: model.cycle() - start,
    };
    log::info!(
        "{name}: {transactions} transactions in {} cycles",
        report.cycles
    );
    Ok(report)
}

fn check_back_to_back(addr: AxiAddr, cycles: u64) -> Result<(), ModelError> {
    if cycles > BACK_TO_BACK_LATENCY {
        return Err(ModelError::LatencyExceeded {
            addr,
            cycles,
            limit: BACK_TO_BACK_LATENCY,
        });
    }
    Ok(())
}

fn write_read(model: &mut AdapterModel, addr: AxiAddr, data: AxiData) -> Result<(), ModelError> {
    let w = model.axil_write(addr, data)?;
    expect_okay(addr, w.resp)?;
    model.next_cycle_high(2);
    let r = model.axil_read(addr)?;
    expect_okay(addr, r.resp)?;
    expect_data(addr, data, r.data)?;
    model.next_cycle_high(2);
    Ok(())
}

/// Write 0x12345678 to offset 0x1000, let the adapter idle, read it back.
pub fn basic(model: &mut AdapterModel) -> Result<ScenarioReport, ModelError> {
    let start = model.cycle();
    let addr = model.mem_window().start().wrapping_add(0x1000);

    let w = model.axil_write(addr, 0x1234_5678)?;
    expect_okay(addr, w.resp)?;
    model.next_cycle_high(5);
    let r = model.axil_read(addr)?;
    expect_okay(addr, r.resp)?;
    expect_data(addr, 0x1234_5678, r.data)?;
    model.next_cycle_high(1);

    finish(model, "basic", start, 2)
}

/// Three writes to consecutive words, each read back before the next.
pub fn sequential(model: &mut AdapterModel) -> Result<ScenarioReport, ModelError> {
    let start = model.cycle();
    let base = model.mem_window().start().wrapping_add(0x1000);
    for i in 0..3u32 {
        write_read(model, base + i * 4, 0x1000_0000 + i * 0x1111_1111)?;
    }
    finish(model, "sequential", start, 6)
}

/// Two writes presented on consecutive opportunities, then both read back.
pub fn back_to_back(model: &mut AdapterModel) -> Result<ScenarioReport, ModelError> {
    let start = model.cycle();
    let base = model.mem_window().start().wrapping_add(0x2000);
    let writes = [(base, 0x55aa_0000), (base + 4, 0x55aa_0001)];

    for (addr, data) in writes {
        let w = model.axil_write(addr, data)?;
        expect_okay(addr, w.resp)?;
        if model.is_unthrottled() {
            check_back_to_back(addr, w.latency())?;
        }
    }
    model.next_cycle_high(5);
    for (addr, data) in writes {
        let r = model.axil_read(addr)?;
        expect_okay(addr, r.resp)?;
        expect_data(addr, data, r.data)?;
    }

    finish(model, "back_to_back", start, 4)
}

/// Reference fixture scenarios, in order.
pub fn smoke(model: &mut AdapterModel) -> Result<Vec<ScenarioReport>, ModelError> {
    Ok(vec![basic(model)?, sequential(model)?, back_to_back(model)?])
}

struct InFlightRead {
    addr: AxiAddr,
    /// Values a racing write may legitimately leave behind
    acceptable: Vec<AxiData>,
}

/// `count` random reads and writes with the write and read paths kept busy
/// at the same time. Reads are checked against the values written; a read
/// racing a write to the same address may return either value.
pub fn stress(
    model: &mut AdapterModel,
    count: u64,
    seed: u64,
) -> Result<ScenarioReport, ModelError> {
    let start = model.cycle();
    let mut rng = StdRng::seed_from_u64(seed);
    let window = model.mem_window();
    let words = ((window.end() - window.start()) / 4 + 1).min(STRESS_WORDS);

    let mut shadow: HashMap<AxiAddr, AxiData> = HashMap::new();
    let mut write: Option<(AxiAddr, AxiData)> = None;
    let mut read: Option<InFlightRead> = None;
    let mut issued = 0;
    let mut completed = 0;
    let mut last_progress = model.cycle();

    while completed < count {
        if issued < count && write.is_none() && rng.gen_bool(0.5) {
            let addr = window.start() + rng.gen_range(0..words) * 4;
            let data: AxiData = rng.gen();
            model.start_write(addr, data)?;
            if let Some(r) = read.as_mut().filter(|r| r.addr == addr) {
                r.acceptable.push(data);
            }
            write = Some((addr, data));
            issued += 1;
        }
        if issued < count && read.is_none() && rng.gen_bool(0.5) {
            let addr = window.start() + rng.gen_range(0..words) * 4;
            let mut acceptable = vec![shadow.get(&addr).copied().unwrap_or(0)];
            if let Some((_, data)) = write.filter(|(a, _)| *a == addr) {
                acceptable.push(data);
            }
            model.start_read(addr)?;
            read = Some(InFlightRead { addr, acceptable });
            issued += 1;
        }

        model.step();

        if let Some(result) = model.take_write_result() {
            let w = result?;
            expect_okay(w.addr, w.resp)?;
            shadow.insert(w.addr, w.data);
            write = None;
            completed += 1;
            last_progress = model.cycle();
        }
        if let Some(result) = model.take_read_result() {
            let r = result?;
            expect_okay(r.addr, r.resp)?;
            if let Some(expected) = read.take() {
                if !expected.acceptable.contains(&r.data) {
                    return Err(ModelError::ReadbackMismatch {
                        addr: r.addr,
                        expected: expected.acceptable[0],
                        actual: r.data,
                    });
                }
            }
            completed += 1;
            last_progress = model.cycle();
        }

        if model.cycle() - last_progress > model.timeout_cycles() {
            return Err(ModelError::Timeout {
                channel: model.pending_channel().unwrap_or(AxiChannel::WriteResp),
                cycles: model.timeout_cycles(),
            });
        }
        model.check_protocol()?;
    }

    finish(model, "stress", start, count)
}
