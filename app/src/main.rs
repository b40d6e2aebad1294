/*++

Licensed under the Apache-2.0 license.

File Name:

    main.rs

Abstract:

    File contains main entrypoint for the AXI4-Lite adapter simulator.

--*/

use std::path::PathBuf;
use std::process::exit;

use anyhow::{anyhow, Context};
use axil_hw_model::{scenarios, AdapterModel, InitParams, LogFile, ReadyPolicy};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;

const MAX_LATENCY: u64 = 1_000_000;

#[derive(Parser)]
#[command(version, about = "Cycle-based model of an AXI4-Lite adapter", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Seed for ready generation and stress traffic
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Extra cycles before the responder answers a request
    #[arg(
        long,
        default_value_t = 0,
        value_parser = clap::value_parser!(u64).range(..=MAX_LATENCY)
    )]
    latency: u64,

    /// Percentage of cycles each ready is asserted on both ports
    #[arg(long, value_name = "PERCENT", value_parser = clap::value_parser!(u8).range(0..=100))]
    backpressure: Option<u8>,

    /// Write a VCD of the adapter signals
    #[arg(long, value_name = "FILE")]
    trace: Option<PathBuf>,

    /// Log every access the responder makes to memory
    #[arg(long, value_name = "FILE")]
    bus_log: Option<PathBuf>,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reference write/read scenarios
    Smoke,
    /// Run random concurrent reads and writes checked against a shadow copy
    Stress {
        #[arg(long, default_value_t = 1000)]
        count: u64,
    },
}

fn init_model(args: &Args) -> anyhow::Result<AdapterModel> {
    let ready = args
        .backpressure
        .map_or(ReadyPolicy::Always, ReadyPolicy::from_percent);
    let bus_log = match &args.bus_log {
        Some(path) => Some(
            LogFile::open(path)
                .with_context(|| format!("cannot create bus log {}", path.display()))?,
        ),
        None => None,
    };
    let defaults = InitParams::default();
    let params = InitParams {
        response_latency: args.latency,
        timeout_cycles: defaults
            .timeout_cycles
            .saturating_add(args.latency.saturating_mul(4)),
        upstream_ready: ready,
        downstream_ready: ready,
        seed: args.seed,
        trace_path: args.trace.clone(),
        bus_log,
        ..defaults
    };
    AdapterModel::init(params).map_err(|e| anyhow!("model init failed: {e}"))
}

fn run(args: &Args) -> anyhow::Result<()> {
    let mut model = init_model(args)?;
    match args.command {
        Commands::Smoke => {
            for report in scenarios::smoke(&mut model)? {
                println!(
                    "{:<14} {:>4} transactions {:>6} cycles",
                    report.name, report.transactions, report.cycles
                );
            }
        }
        Commands::Stress { count } => {
            let report = scenarios::stress(&mut model, count, args.seed)?;
            println!(
                "{} transactions in {} cycles, {} writes / {} reads at the responder",
                report.transactions,
                report.cycles,
                model.responder().stats().writes,
                model.responder().stats().reads,
            );
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    let _ = SimpleLogger::new().with_level(args.log_level).init();
    run(&args).unwrap_or_else(|e| {
        log::error!("Error: {e:#}");
        exit(1);
    });
}
