//! logicsim - digital logic simulator
//!
//! Loads a netlist, applies any `--set` values, advances time in fixed
//! steps, and prints the probed nets as a tab-separated table.
//!
//! # Usage
//!
//! ```bash
//! logicsim counter.lsn --steps 20 --dt 5 --set en=1 --probe q
//! ```

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use logicsim_core::{
    circuit::Design,
    error::{LogicError, Result},
    value::Signal,
    waveform::{record, WaveformWriter},
    Simulator, SimulatorConfig, DEFAULT_MAX_ROUNDS,
};

/// Three-valued digital logic simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the netlist file
    #[arg(value_name = "NETLIST_FILE")]
    netlist_file: PathBuf,

    /// Number of time steps to simulate
    #[arg(short, long, default_value_t = 10)]
    steps: usize,

    /// Length of each time step in milliseconds
    #[arg(short, long, default_value_t = 1.0)]
    dt: f64,

    /// Round ceiling per propagation pass
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    max_rounds: usize,

    /// Set a source before simulating, as LABEL=VALUE
    #[arg(long = "set", value_name = "LABEL=VALUE")]
    sets: Vec<String>,

    /// Net to print (repeatable); defaults to the netlist's .probe list
    #[arg(short, long = "probe", value_name = "NET")]
    probes: Vec<String>,
}

fn parse_assignment(text: &str) -> Result<(&str, Signal)> {
    let (label, value) = text.split_once('=').ok_or_else(|| LogicError::InvalidSimulationParam {
        message: format!("expected LABEL=VALUE, got '{}'", text),
    })?;
    let signal = Signal::parse(value, None).ok_or_else(|| LogicError::InvalidSimulationParam {
        message: format!("cannot parse value '{}'", value),
    })?;
    Ok((label, signal))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let design = Design::from_file(&args.netlist_file)?;
    info!(top = design.top.as_str(), circuits = design.library.len(), "loaded netlist");

    let config = SimulatorConfig::new().with_max_rounds(args.max_rounds);
    let mut simulator = Simulator::with_config(design.library, &design.top, config)?;

    for assignment in &args.sets {
        let (label, value) = parse_assignment(assignment)?;
        simulator.set_by_label(label, value)?;
    }

    let probes = if args.probes.is_empty() { design.probes } else { args.probes };
    let mut writer = WaveformWriter::new(io::stdout().lock(), probes);
    let faults = record(&mut simulator, &mut writer, args.steps, args.dt)?;
    for fault in &faults {
        warn!("{}", fault);
    }

    Ok(())
}
