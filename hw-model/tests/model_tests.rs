// Licensed under the Apache-2.0 license

use axil_adapter::{ReadState, WriteState};
use axil_emu_bus::Bus;
use axil_emu_types::{AxiChannel, AxiResp};
use axil_hw_model::{scenarios, AdapterModel, InitParams, LogFile, ModelError, ReadyPolicy};

fn model() -> AdapterModel {
    AdapterModel::init(InitParams::default()).unwrap()
}

fn throttled(percent: u8, seed: u64) -> AdapterModel {
    AdapterModel::init(InitParams {
        upstream_ready: ReadyPolicy::from_percent(percent),
        downstream_ready: ReadyPolicy::from_percent(percent),
        response_latency: 2,
        seed,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_basic_write_then_read() {
    let mut model = model();
    let w = model.axil_write(0x1000, 0x1234_5678).unwrap();
    assert_eq!(w.resp, AxiResp::Okay);
    model.next_cycle_high(5);
    let r = model.axil_read(0x1000).unwrap();
    assert_eq!(r.data, 0x1234_5678);
    assert_eq!(r.resp, AxiResp::Okay);
    assert!(model.violations().is_empty());
}

#[test]
fn test_reference_scenarios() {
    let mut model = model();
    let basic = scenarios::basic(&mut model).unwrap();
    assert_eq!(basic.transactions, 2);
    scenarios::sequential(&mut model).unwrap();
    scenarios::back_to_back(&mut model).unwrap();
    for (addr, data) in [
        (0x1000, 0x1000_0000),
        (0x1004, 0x2111_1111),
        (0x1008, 0x3222_2222),
        (0x2000, 0x55aa_0000),
        (0x2004, 0x55aa_0001),
    ] {
        assert_eq!(model.responder_mut().read(addr), Ok(data));
    }
}

#[test]
fn test_scenarios_with_offset_window() {
    let mut model = AdapterModel::init(InitParams {
        mem_base: 0x8000_0000,
        mem_size: 0x4000,
        ..Default::default()
    })
    .unwrap();
    scenarios::smoke(&mut model).unwrap();
    assert_eq!(model.responder_mut().read(0x8000_1000), Ok(0x1000_0000));
}

#[test]
fn test_address_data_fidelity() {
    let mut model = model();
    let pattern = |i: u32| i.wrapping_mul(0x9e37_79b9) ^ 0xa5a5_a5a5;
    for i in 0..32u32 {
        model.axil_write(0x100 + i * 4, pattern(i)).unwrap();
    }
    for i in (0..32u32).rev() {
        let r = model.axil_read(0x100 + i * 4).unwrap();
        assert_eq!(r.data, pattern(i), "word {i}");
        assert_eq!(r.addr, 0x100 + i * 4);
    }
}

#[test]
fn test_forced_responses_forwarded() {
    let mut model = model();
    for resp in [AxiResp::ExOkay, AxiResp::SlvErr, AxiResp::DecErr, AxiResp::Okay] {
        model.set_forced_response(Some(resp));
        assert_eq!(model.axil_write(0x40, 0x1).unwrap().resp, resp);
        assert_eq!(model.axil_read(0x40).unwrap().resp, resp);
    }
    model.set_forced_response(None);
    assert_eq!(model.responder().stats().error_responses, 4);
    assert_eq!(model.responder().stats().writes, 4);
    assert_eq!(model.responder().stats().reads, 4);
}

#[test]
fn test_bus_errors_become_responses() {
    let mut model = model();
    // Outside the RAM window
    assert_eq!(model.axil_write(0x2_0000, 0).unwrap().resp, AxiResp::DecErr);
    assert_eq!(model.axil_read(0x2_0000).unwrap().resp, AxiResp::DecErr);
    // Not word aligned
    assert_eq!(model.axil_write(0x1002, 0).unwrap().resp, AxiResp::SlvErr);
    let r = model.axil_read(0x1002).unwrap();
    assert_eq!(r.resp, AxiResp::SlvErr);
    assert_eq!(r.data, 0);
}

#[test]
fn test_write_and_read_in_flight_together() {
    let mut model = model();
    model.axil_write(0x30, 0x3333).unwrap();
    model.start_write(0x20, 0x2222).unwrap();
    model.start_read(0x30).unwrap();
    let issued = model.cycle();

    let mut overlapped = false;
    model.step_until(|m| {
        overlapped |= !matches!(m.adapter().write_state(), WriteState::Idle)
            && !matches!(m.adapter().read_state(), ReadState::Idle);
        !m.write_in_flight() && !m.read_in_flight()
    });
    assert!(overlapped);

    let w = model.take_write_result().unwrap().unwrap();
    let r = model.take_read_result().unwrap().unwrap();
    assert_eq!(w.issued, issued);
    assert_eq!(w.latency(), 4);
    assert_eq!(r.latency(), 4);
    assert_eq!(r.data, 0x3333);
    assert!(model.paths_idle());
}

#[test]
fn test_read_completes_while_write_waits() {
    let mut model = AdapterModel::init(InitParams {
        response_latency: 20,
        ..Default::default()
    })
    .unwrap();
    model.start_write(0x0, 0xaaaa).unwrap();
    model.next_cycle_high(3);
    assert!(matches!(
        model.adapter().write_state(),
        WriteState::AwaitUpstreamB
    ));

    model.responder_mut().write(0x8, 0xbbbb).unwrap();
    model.responder_mut().set_latency(0);
    model.start_read(0x8).unwrap();
    model.step_until(|m| !m.read_in_flight() || !m.write_in_flight());
    assert!(model.write_in_flight());
    assert_eq!(model.take_read_result().unwrap().unwrap().data, 0xbbbb);

    model.step_until(|m| !m.write_in_flight());
    assert_eq!(model.take_write_result().unwrap().unwrap().resp, AxiResp::Okay);
    assert!(model.violations().is_empty());
}

#[test]
fn test_back_to_back_latency() {
    let mut model = model();
    assert!(model.is_unthrottled());
    let first = model.axil_write(0x2000, 0x55aa_0000).unwrap();
    let second = model.axil_write(0x2004, 0x55aa_0001).unwrap();
    assert_eq!(first.latency(), scenarios::BACK_TO_BACK_LATENCY);
    assert_eq!(second.latency(), scenarios::BACK_TO_BACK_LATENCY);
    assert_eq!(second.issued, first.completed);
    assert_eq!(model.axil_read(0x2000).unwrap().data, 0x55aa_0000);
    assert_eq!(model.axil_read(0x2004).unwrap().data, 0x55aa_0001);
}

#[test]
fn test_reset_quiets_and_clears() {
    let mut model = AdapterModel::init(InitParams {
        response_latency: 10,
        ..Default::default()
    })
    .unwrap();
    model.start_write(0x10, 0x1).unwrap();
    model.start_read(0x10).unwrap();
    model.next_cycle_high(3);

    model.set_reset(true);
    assert!(!model.output().any_handshake_asserted());
    model.step();
    assert_eq!(model.take_write_result(), Some(Err(ModelError::Aborted)));
    assert_eq!(model.take_read_result(), Some(Err(ModelError::Aborted)));
    model.next_cycle_high(3);
    assert!(!model.output().any_handshake_asserted());

    model.set_reset(false);
    model.next_cycle_high(20);
    assert!(model.paths_idle());
    assert!(!model.output().any_handshake_asserted());
    assert!(model.take_write_result().is_none());

    assert_eq!(model.axil_write(0x14, 0x2).unwrap().resp, AxiResp::Okay);
    assert_eq!(model.axil_read(0x14).unwrap().data, 0x2);
    assert!(model.violations().is_empty());
}

#[test]
fn test_scheduled_reset_aborts_transaction() {
    let mut model = AdapterModel::init(InitParams {
        response_latency: 10,
        ..Default::default()
    })
    .unwrap();
    model.schedule_reset_in(3);
    assert_eq!(model.axil_write(0x10, 0x1), Err(ModelError::Aborted));
    assert!(model.in_reset());
    model.step_until(|m| !m.in_reset());
    model.next_cycle_high(1);
    assert!(model.paths_idle());
    assert_eq!(model.axil_write(0x10, 0x2).unwrap().resp, AxiResp::Okay);
    assert_eq!(model.axil_read(0x10).unwrap().data, 0x2);
}

#[test]
fn test_upstream_stall_times_out() {
    let mut model = AdapterModel::init(InitParams {
        upstream_ready: ReadyPolicy::Never,
        timeout_cycles: 16,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(
        model.axil_write(0x0, 0x1),
        Err(ModelError::Timeout {
            channel: AxiChannel::WriteAddr,
            cycles: 16
        })
    );
    assert_eq!(model.start_write(0x0, 0x1), Err(ModelError::PathBusy));
    assert!(model.output().m_axil_awvalid);
    assert!(!model.output().s_axil_awready);
    assert!(model.violations().is_empty());
}

#[test]
fn test_max_latency_times_out() {
    let mut model = AdapterModel::init(InitParams {
        response_latency: u64::MAX,
        timeout_cycles: 8,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(
        model.axil_write(0x0, 0x1),
        Err(ModelError::Timeout {
            channel: AxiChannel::WriteResp,
            cycles: 8
        })
    );
    assert!(model.write_in_flight());
    assert!(!model.output().s_axil_bvalid);
}

#[test]
fn test_downstream_stall_times_out() {
    let mut model = AdapterModel::init(InitParams {
        downstream_ready: ReadyPolicy::Never,
        timeout_cycles: 16,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(
        model.axil_read(0x0),
        Err(ModelError::Timeout {
            channel: AxiChannel::ReadData,
            cycles: 16
        })
    );
    assert!(model.output().s_axil_rvalid);
    assert!(!model.output().m_axil_arvalid);
}

#[test]
fn test_random_backpressure_is_clean() {
    for seed in 0..4 {
        let mut model = throttled(50, seed);
        scenarios::smoke(&mut model).unwrap();
        let report = scenarios::stress(&mut model, 200, seed).unwrap();
        assert_eq!(report.transactions, 200);
        assert!(model.violations().is_empty(), "seed {seed}");
    }
}

#[test]
fn test_stress_unthrottled() {
    let mut model = model();
    let report = scenarios::stress(&mut model, 500, 7).unwrap();
    assert_eq!(report.name, "stress");
    assert!(report.cycles >= 4 * 250);
    assert!(model.paths_idle());
}

#[test]
fn test_bus_log() {
    let path = std::env::temp_dir().join("axil_hw_model_bus.log");
    {
        let mut model = AdapterModel::init(InitParams {
            bus_log: Some(LogFile::open(&path).unwrap()),
            ..Default::default()
        })
        .unwrap();
        model.axil_write(0x10, 0x5).unwrap();
        model.axil_read(0x10).unwrap();
        model.axil_read(0x2_0000).unwrap();
    }
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "AXIL write *0x00000010 <- 0x5\n\
         AXIL  read *0x00000010 -> 0x5\n\
         AXIL  read *0x00020000 ***FAULT LoadAccessFault\n"
    );
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_trace_file() {
    let path = std::env::temp_dir().join("axil_hw_model_trace.vcd");
    {
        let mut model = AdapterModel::init(InitParams {
            trace_path: Some(path.clone()),
            ..Default::default()
        })
        .unwrap();
        model.axil_write(0x10, 0x5).unwrap();
    }
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("$enddefinitions $end"));
    assert!(text.contains("#0\n"));
    assert!(text.contains("#100\n"));
    std::fs::remove_file(&path).ok();
}
