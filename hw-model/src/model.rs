// Licensed under the Apache-2.0 license

use std::error::Error;
use std::io;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use axil_adapter::{AxilAdapter, ReadState, SigIn, SigOut, WriteState};
use axil_emu_bus::{Bus, Clock, DynamicBus, Ram, Timer, TimerAction};
use axil_emu_types::{AxiAddr, AxiChannel, AxiData, AxiResp};

use crate::axil_bus::AxilBus;
use crate::bus_logger::BusLogger;
use crate::monitor::{ProtocolMonitor, Violation};
use crate::originator::{Originator, ReadResult, WriteResult};
use crate::policy::ReadyPolicy;
use crate::responder::Responder;
use crate::{InitParams, ModelError, TRACE_PATH_ENV};

/// The adapter wired between an originator and a memory-backed responder,
/// stepped one rising edge at a time.
pub struct AdapterModel {
    adapter: AxilAdapter,
    input: SigIn,
    output: SigOut,

    clock: Clock,
    timer: Timer,

    originator: Originator,
    responder: Responder<BusLogger<DynamicBus>>,
    monitor: ProtocolMonitor,

    mem_window: RangeInclusive<AxiAddr>,
    reset_cycles: u64,
    timeout_cycles: u64,

    /// `rstn` held low by `set_reset()`
    reset_forced: bool,
    /// Edges left on a timed reset
    reset_hold: u64,

    unthrottled: bool,
}

impl AdapterModel {
    pub fn init(params: InitParams) -> Result<Self, Box<dyn Error>> {
        if params.mem_size == 0 {
            return Err("memory window must not be empty".into());
        }
        let mem_end = params
            .mem_base
            .checked_add(params.mem_size - 1)
            .ok_or("memory window exceeds the address space")?;
        let mem_window = params.mem_base..=mem_end;

        let mut bus = DynamicBus::new();
        bus.attach_dev(
            "RAM",
            mem_window.clone(),
            Box::new(Ram::new(params.mem_size as usize)),
        )?;
        let mut bus = BusLogger::new(bus);
        bus.log = params.bus_log;

        let clock = Clock::new();
        let responder = Responder::new(
            bus,
            clock.timer(),
            params.response_latency,
            params.upstream_ready,
            params.seed,
        );
        // Separate stream so the two ports don't roll in lockstep
        let originator = Originator::new(params.downstream_ready, params.seed ^ 0x5eed_0000);

        let mut m = AdapterModel {
            adapter: AxilAdapter::new(),
            input: SigIn::default(),
            output: SigOut::default(),
            timer: clock.timer(),
            clock,
            originator,
            responder,
            monitor: ProtocolMonitor::new(),
            mem_window,
            reset_cycles: params.reset_cycles,
            timeout_cycles: params.timeout_cycles,
            reset_forced: false,
            reset_hold: params.reset_cycles,
            unthrottled: params.response_latency == 0
                && params.upstream_ready == ReadyPolicy::Always
                && params.downstream_ready == ReadyPolicy::Always,
        };

        let trace_path = params
            .trace_path
            .or_else(|| std::env::var_os(TRACE_PATH_ENV).map(PathBuf::from));
        if let Some(path) = trace_path {
            m.start_tracing(&path)?;
        }

        m.next_cycle_high(params.reset_cycles);
        m.next_cycle_high(params.settle_cycles);
        log::debug!(
            "model ready at cycle {}, RAM {:#010x}-{:#010x}",
            m.cycle(),
            m.mem_window.start(),
            m.mem_window.end()
        );
        Ok(m)
    }

    /// One rising edge. Every component samples the same pre-edge signals.
    pub fn step(&mut self) {
        self.settle();
        let input = self.input;
        let out = self.output;
        let now = self.clock.now();

        self.monitor.observe(now, &input, &out);
        self.adapter.tick(&input);
        if input.rstn {
            self.originator.clock(&input, &out, now + 1);
            self.responder.clock(&input, &out);
        } else {
            self.originator.reset();
            self.responder.reset();
        }
        self.reset_hold = self.reset_hold.saturating_sub(1);

        for action in self.clock.increment(1) {
            match action {
                TimerAction::Poll => self.responder.poll(),
                TimerAction::WarmReset => {
                    log::info!("warm reset at cycle {}", self.clock.now());
                    self.reset_hold = self.reset_cycles.max(1);
                    self.responder.warm_reset();
                }
            }
        }
        self.settle();
    }

    pub fn next_cycle_high(&mut self, n_cycles: u64) {
        for _ in 0..n_cycles {
            self.step();
        }
    }

    /// Execute until the result of `predicate` becomes true.
    pub fn step_until(&mut self, mut predicate: impl FnMut(&mut Self) -> bool) {
        while !predicate(self) {
            self.step();
        }
    }

    /// Write `data` to `addr` through the adapter and wait for the response.
    pub fn axil_write(&mut self, addr: AxiAddr, data: AxiData) -> Result<WriteResult, ModelError> {
        self.start_write(addr, data)?;
        let deadline = self.cycle().saturating_add(self.timeout_cycles);
        loop {
            if let Some(result) = self.originator.take_write_result() {
                return result;
            }
            if self.cycle() >= deadline {
                return Err(self.timeout(self.originator.write_channel()));
            }
            self.step();
        }
    }

    /// Read `addr` through the adapter and wait for the data.
    pub fn axil_read(&mut self, addr: AxiAddr) -> Result<ReadResult, ModelError> {
        self.start_read(addr)?;
        let deadline = self.cycle().saturating_add(self.timeout_cycles);
        loop {
            if let Some(result) = self.originator.take_read_result() {
                return result;
            }
            if self.cycle() >= deadline {
                return Err(self.timeout(self.originator.read_channel()));
            }
            self.step();
        }
    }

    /// Present a write on the next edge without waiting for it.
    pub fn start_write(&mut self, addr: AxiAddr, data: AxiData) -> Result<(), ModelError> {
        self.originator.start_write(addr, data, self.cycle())?;
        self.settle();
        Ok(())
    }

    pub fn start_read(&mut self, addr: AxiAddr) -> Result<(), ModelError> {
        self.originator.start_read(addr, self.cycle())?;
        self.settle();
        Ok(())
    }

    pub fn take_write_result(&mut self) -> Option<Result<WriteResult, ModelError>> {
        self.originator.take_write_result()
    }

    pub fn take_read_result(&mut self) -> Option<Result<ReadResult, ModelError>> {
        self.originator.take_read_result()
    }

    /// The handshake an in-flight transaction is waiting on, write path
    /// first.
    pub fn pending_channel(&self) -> Option<AxiChannel> {
        self.originator
            .write_channel()
            .or_else(|| self.originator.read_channel())
    }

    pub fn timeout_cycles(&self) -> u64 {
        self.timeout_cycles
    }

    pub fn write_in_flight(&self) -> bool {
        self.originator.write_channel().is_some()
    }

    pub fn read_in_flight(&self) -> bool {
        self.originator.read_channel().is_some()
    }

    /// True when no transaction is in flight anywhere in the environment.
    pub fn paths_idle(&self) -> bool {
        self.originator.is_idle()
            && self.responder.is_idle()
            && matches!(self.adapter.write_state(), WriteState::Idle)
            && matches!(self.adapter.read_state(), ReadState::Idle)
    }

    /// Hold `rstn` low until called again with `false`.
    pub fn set_reset(&mut self, asserted: bool) {
        self.reset_forced = asserted;
        self.settle();
    }

    /// Pull `rstn` low for `reset_cycles` edges, starting `ticks` edges from
    /// now.
    pub fn schedule_reset_in(&mut self, ticks: u64) {
        self.timer.schedule_action_in(ticks, TimerAction::WarmReset);
    }

    pub fn in_reset(&self) -> bool {
        !self.input.rstn
    }

    pub fn violations(&self) -> &[Violation] {
        self.monitor.violations()
    }

    /// The first protocol violation seen, as an error.
    pub fn check_protocol(&self) -> Result<(), ModelError> {
        match self.monitor.violations().first() {
            Some(v) => Err(ModelError::ProtocolViolation(*v)),
            None => Ok(()),
        }
    }

    /// Each access made through the returned bus is a full AXI4-Lite
    /// transaction through the adapter.
    pub fn axil_bus(&mut self) -> AxilBus<'_> {
        AxilBus::new(self)
    }

    pub fn set_forced_response(&mut self, resp: Option<AxiResp>) {
        self.responder.set_forced_response(resp);
    }

    pub fn responder(&self) -> &Responder<BusLogger<DynamicBus>> {
        &self.responder
    }

    /// Backdoor access to the memory behind the adapter.
    pub fn responder_mut(&mut self) -> &mut Responder<BusLogger<DynamicBus>> {
        &mut self.responder
    }

    pub fn adapter(&self) -> &AxilAdapter {
        &self.adapter
    }

    pub fn input(&self) -> &SigIn {
        &self.input
    }

    pub fn output(&self) -> &SigOut {
        &self.output
    }

    /// Number of edges since init started.
    pub fn cycle(&self) -> u64 {
        self.clock.now()
    }

    pub fn mem_window(&self) -> RangeInclusive<AxiAddr> {
        self.mem_window.clone()
    }

    /// Both ports always ready and no added responder latency.
    pub fn is_unthrottled(&self) -> bool {
        self.unthrottled
    }

    pub fn start_tracing(&mut self, path: &Path) -> io::Result<()> {
        self.adapter.start_tracing(path)
    }

    pub fn stop_tracing(&mut self) {
        self.adapter.stop_tracing();
    }

    fn timeout(&self, channel: Option<AxiChannel>) -> ModelError {
        let err = ModelError::Timeout {
            channel: channel.unwrap_or(AxiChannel::WriteResp),
            cycles: self.timeout_cycles,
        };
        log::warn!("cycle {}: {err}", self.cycle());
        err
    }

    /// Re-drive the inputs from the models and settle the adapter outputs.
    fn settle(&mut self) {
        self.input.rstn = !(self.reset_forced || self.reset_hold > 0);
        self.originator.drive(&mut self.input);
        self.responder.drive(&mut self.input);
        self.output = self.adapter.eval(&self.input);
    }
}
