//! `fleet-cli` — load a scenario, run it to completion, and write CSV
//! output. A thin wiring layer: everything it does is a call into
//! `fleet_sim`/`fleet_output`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use fleet_core::Tick;
use fleet_output::{CsvWriter, OutputWriter, SimOutputObserver};
use fleet_sim::{load_scenario_json, RunOutcome, SimObserver, Snapshot};

#[derive(Parser)]
#[command(name = "fleet-cli", about = "Run a fleet charging-coordination scenario")]
struct Args {
    /// Path to a scenario JSON file.
    scenario: PathBuf,

    /// Directory to write vehicle_snapshots.csv / station_snapshots.csv into.
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Cap the run at this many additional ticks, independent of the
    /// scenario's own `max_steps`.
    #[arg(long)]
    max_ticks: Option<u64>,
}

/// Forwards every hook to an inner output observer, additionally logging
/// deadlock recovery and stranded vehicles as they happen.
struct CliObserver<W: OutputWriter> {
    inner: SimOutputObserver<W>,
    ticks_run: u64,
}

impl<W: OutputWriter> CliObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, ticks_run: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CliObserver<W> {
    fn on_start(&mut self, snapshot: &Snapshot) {
        self.inner.on_start(snapshot);
    }

    fn on_tick(&mut self, tick: Tick, snapshot: &Snapshot) {
        self.ticks_run += 1;
        for line in &snapshot.log {
            info!(%tick, "{line}");
        }
        self.inner.on_tick(tick, snapshot);
    }

    fn on_deadlock(&mut self, tick: Tick) {
        warn!(%tick, "deadlock escape hatch triggered");
    }

    fn on_finish(&mut self, snapshot: &Snapshot) {
        self.inner.on_finish(snapshot);
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let json = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading scenario file {}", args.scenario.display()))?;

    let mut sim = match load_scenario_json(&json) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return Ok(ExitCode::from(1));
        }
    };

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;
    let writer = CsvWriter::new(&args.out_dir)
        .with_context(|| format!("opening CSV writer in {}", args.out_dir.display()))?;
    let mut observer = CliObserver::new(SimOutputObserver::new(writer));

    let snapshot = sim.run_until(args.max_ticks, &mut observer);

    if let Some(e) = observer.inner.take_error() {
        eprintln!("output error: {e}");
        return Ok(ExitCode::from(2));
    }

    let stranded: Vec<_> = snapshot.vehicles.iter().filter(|v| {
        sim.vehicles().iter().any(|vv| vv.id == v.id && vv.stranded)
    }).collect();

    info!(
        tick = %snapshot.tick,
        ticks_run = observer.ticks_run,
        vehicles = snapshot.vehicles.len(),
        stranded = stranded.len(),
        "run finished"
    );

    match sim.outcome() {
        RunOutcome::TimedOut => {
            eprintln!("timed out at tick {} with vehicles still active", snapshot.tick);
            Ok(ExitCode::from(3))
        }
        RunOutcome::Completed if !stranded.is_empty() => {
            eprintln!("completed with {} stranded vehicle(s)", stranded.len());
            Ok(ExitCode::from(2))
        }
        RunOutcome::Completed => Ok(ExitCode::SUCCESS),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
