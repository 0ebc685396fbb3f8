//! downtown — runnable demo for the rust_tm traffic simulation.
//!
//! Simulates signal-controlled intersections, commuting vehicles and
//! patrolling drones on a small square grid, printing the grid every
//! snapshot tick and a statistics summary at the end.
//!
//! Usage:
//!   cargo run -p downtown -- --steps 100 --grid-size 5 --vehicles 10 --drones 2
//!   cargo run -p downtown -- --config downtown.json --output output/downtown
//!   RUST_LOG=tm_agents=debug cargo run -p downtown -- --delay 0

mod render;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tm_agents::Anomaly;
use tm_core::{SimConfig, Tick};
use tm_output::{CsvWriter, OutputWriter, SimOutputObserver};
use tm_sim::{Sim, SimBuilder, SimObserver, SimStats};
use tm_spatial::Grid;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Smart traffic management demo: signals, vehicles and drones on a grid.
///
/// Flags override values loaded from `--config`; anything unset falls back
/// to the built-in defaults (5×5 grid, 10 vehicles, 2 drones, 100 steps).
#[derive(Parser, Debug)]
#[command(name = "downtown", version)]
struct Args {
    /// Number of simulation steps to run.
    #[arg(long)]
    steps: Option<u64>,

    /// Side length of the square grid.
    #[arg(long)]
    grid_size: Option<u32>,

    /// Number of vehicles to simulate.
    #[arg(long)]
    vehicles: Option<usize>,

    /// Number of drones to deploy.
    #[arg(long)]
    drones: Option<usize>,

    /// Master RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Render the grid every N ticks (0 = never).
    #[arg(long)]
    interval: Option<u64>,

    /// Delay between steps in seconds.
    #[arg(long, default_value_t = 0.2)]
    delay: f64,

    /// Print detailed simulation information (info-level logs and anomalies).
    #[arg(long)]
    verbose: bool,

    /// JSON file holding a full or partial `SimConfig`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for `tick_stats.csv`, `occupancy.csv` and `anomalies.csv`.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SimConfig::default(),
        };
        if let Some(steps) = self.steps {
            config.total_ticks = steps;
        }
        if let Some(size) = self.grid_size {
            config.grid_size = size;
        }
        if let Some(n) = self.vehicles {
            config.vehicle_count = n;
        }
        if let Some(n) = self.drones {
            config.sentinel_count = n;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(interval) = self.interval {
            config.output_interval_ticks = interval;
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

// ── Observer: render, pace and forward to CSV ────────────────────────────────

struct DemoObserver<W: OutputWriter> {
    output:    Option<SimOutputObserver<W>>,
    delay:     Duration,
    verbose:   bool,
    last:      SimStats,
    anomalies: usize,
}

impl<W: OutputWriter> SimObserver for DemoObserver<W> {
    fn on_tick_start(&mut self, tick: Tick) {
        if let Some(out) = &mut self.output {
            out.on_tick_start(tick);
        }
    }

    fn on_anomaly(&mut self, tick: Tick, anomaly: &Anomaly) {
        self.anomalies += 1;
        if self.verbose {
            println!("[{tick}] {anomaly}");
        }
        if let Some(out) = &mut self.output {
            out.on_anomaly(tick, anomaly);
        }
    }

    fn on_tick_end(&mut self, tick: Tick, stats: &SimStats) {
        self.last.clone_from(stats);
        if let Some(out) = &mut self.output {
            out.on_tick_end(tick, stats);
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }

    fn on_snapshot(&mut self, tick: Tick, grid: &Grid) {
        println!();
        println!(
            "Step {}  |  arrived {}/{}  |  congestion {}  |  incidents {}",
            tick.0 + 1,
            self.last.arrived,
            self.last.vehicles,
            self.last.congestion_events,
            self.last.incidents
        );
        print!("{}", render::grid(grid));
        if let Some(out) = &mut self.output {
            out.on_snapshot(tick, grid);
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick, stats: &SimStats) {
        if let Some(out) = &mut self.output {
            out.on_sim_end(final_tick, stats);
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise warn, or info with --verbose.
    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    if !args.delay.is_finite() || args.delay < 0.0 {
        bail!("--delay must be a non-negative number of seconds, got {}", args.delay);
    }

    let config = args.sim_config()?;
    println!("=== downtown — rust_tm traffic simulation ===");
    println!(
        "Grid: {0}×{0}  |  Vehicles: {1}  |  Drones: {2}  |  Steps: {3}  |  Seed: {4}",
        config.grid_size, config.vehicle_count, config.sentinel_count, config.total_ticks, config.seed
    );

    let mut sim = SimBuilder::new(config).build()?;
    println!("Signals placed: {}", sim.signals().len());

    let output = match &args.output {
        Some(dir) => Some(SimOutputObserver::new(
            CsvWriter::new(dir).with_context(|| format!("creating output in {}", dir.display()))?,
        )),
        None => None,
    };
    let mut obs = DemoObserver {
        output,
        delay: Duration::from_secs_f64(args.delay),
        verbose: args.verbose,
        last: sim.stats().clone(),
        anomalies: 0,
    };

    let t0 = Instant::now();
    sim.run(&mut obs);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.output.as_mut().and_then(SimOutputObserver::take_error) {
        eprintln!("output error: {e}");
    }

    print_summary(&sim, obs.anomalies, elapsed);
    if let Some(dir) = &args.output {
        println!("CSV output written to {}", dir.display());
    }
    Ok(())
}

fn print_summary(sim: &Sim, anomalies: usize, elapsed: Duration) {
    println!();
    println!("Final state:");
    print!("{}", render::grid(sim.grid()));
    print!("{}", render::agents(sim));
    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("{}", sim.stats());
    println!("Anomalies observed:       {anomalies}");
}
