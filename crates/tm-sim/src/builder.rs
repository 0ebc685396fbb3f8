//! Fluent builder for constructing a [`Sim`].

use tm_agents::{Agent, PatrolBox, SentinelAgent, SignalAgent, VehicleAgent};
use tm_bus::{BusConfig, EventBus};
use tm_core::{
    AgentRef, AgentRng, Cell, SentinelId, SignalId, SignalPhase, SimClock, SimConfig, SimRng,
    VehicleId,
};
use tm_spatial::Grid;
use tracing::info;

use crate::{Sim, SimError, SimResult, SimStats};

/// Fluent builder for [`Sim`].
///
/// Rosters not supplied explicitly are generated from the config using a
/// [`SimRng`] seeded with `config.seed`:
///
/// | Method            | Default                                                  |
/// |-------------------|----------------------------------------------------------|
/// | `.signals(v)`     | One signal per lattice point, random initial phase      |
/// | `.vehicles(v)`    | `vehicle_count` random distinct origin/destination trips |
/// | `.sentinels(v)`   | `sentinel_count` drones, random start, quadrant patrols  |
///
/// Supplied rosters must be non-empty (vehicles only) and lie on the
/// config's grid.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config)
///     .vehicles(vec![VehicleAgent::new(VehicleId(0), origin, dest, 5)?])
///     .sentinels(Vec::new())
///     .build()?;
/// sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder {
    config:    SimConfig,
    signals:   Option<Vec<SignalAgent>>,
    vehicles:  Option<Vec<VehicleAgent>>,
    sentinels: Option<Vec<SentinelAgent>>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            signals:   None,
            vehicles:  None,
            sentinels: None,
        }
    }

    /// Use this signal roster instead of the lattice placement.  An empty
    /// vector means no signals.
    pub fn signals(mut self, signals: Vec<SignalAgent>) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn vehicles(mut self, vehicles: Vec<VehicleAgent>) -> Self {
        self.vehicles = Some(vehicles);
        self
    }

    /// Use this sentinel roster.  An empty vector means no monitoring.
    pub fn sentinels(mut self, sentinels: Vec<SentinelAgent>) -> Self {
        self.sentinels = Some(sentinels);
        self
    }

    /// Validate the config, generate any missing rosters, seed per-agent
    /// RNGs and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        let config = self.config;
        config.validate()?;

        let seed = config.seed;
        let size = config.grid_size;
        let mut setup = SimRng::new(seed);

        let signals = match self.signals {
            Some(s) => s,
            None => place_signals(&config, &mut setup)?,
        };
        let vehicles = match self.vehicles {
            Some(v) => v,
            None => random_trips(&config, &mut setup)?,
        };
        if vehicles.is_empty() {
            return Err(SimError::EmptyRoster { what: "vehicle" });
        }

        // Generated sentinels consume their own stream while drawing their
        // first waypoint loop; that stream continues into the run.
        let (sentinels, sentinel_rngs) = match self.sentinels {
            Some(s) => {
                let rngs = rngs_for(&s, seed);
                (s, rngs)
            }
            None => spawn_sentinels(&config, &mut setup)?,
        };

        check_on_grid(&signals, size)?;
        check_on_grid(&vehicles, size)?;
        check_on_grid(&sentinels, size)?;

        let signal_rngs = rngs_for(&signals, seed);
        let vehicle_rngs = rngs_for(&vehicles, seed);

        info!(
            grid_size = size,
            signals = signals.len(),
            vehicles = vehicles.len(),
            sentinels = sentinels.len(),
            seed,
            "simulation built"
        );

        let mut sim = Sim {
            clock: SimClock::new(),
            bus: EventBus::with_config(BusConfig { history: config.bus_history }),
            grid: Grid::new(size),
            config,
            signals,
            vehicles,
            sentinels,
            signal_rngs,
            vehicle_rngs,
            sentinel_rngs,
            congestion: Vec::new(),
            stats: SimStats::default(),
        };
        sim.rebuild_grid();
        sim.refresh_stats();
        Ok(sim)
    }
}

// ── Roster generation ─────────────────────────────────────────────────────────

/// Signals at every `(x, y)` on the lattice `{i, 2i, …} < grid_size` with
/// `i = max(1, grid_size / 3)`.
fn place_signals(config: &SimConfig, rng: &mut SimRng) -> SimResult<Vec<SignalAgent>> {
    let size = config.grid_size as i32;
    let interval = (size / 3).max(1) as usize;
    let mut signals = Vec::new();

    for x in (interval as i32..size).step_by(interval) {
        for y in (interval as i32..size).step_by(interval) {
            let id = SignalId(signals.len() as u32);
            let phase = rng.choose(&SignalPhase::ALL).copied().unwrap_or(SignalPhase::Red);
            signals.push(SignalAgent::new(
                id,
                Cell::new(x, y),
                phase,
                config.signal_timing,
                config.grid_size,
            )?);
        }
    }
    Ok(signals)
}

fn random_trips(config: &SimConfig, rng: &mut SimRng) -> SimResult<Vec<VehicleAgent>> {
    (0..config.vehicle_count)
        .map(|i| {
            let origin = rng.cell(config.grid_size);
            let mut destination = rng.cell(config.grid_size);
            while destination == origin {
                destination = rng.cell(config.grid_size);
            }
            Ok(VehicleAgent::new(VehicleId(i as u32), origin, destination, config.grid_size)?)
        })
        .collect()
}

fn spawn_sentinels(
    config: &SimConfig,
    rng:    &mut SimRng,
) -> SimResult<(Vec<SentinelAgent>, Vec<AgentRng>)> {
    let mut sentinels = Vec::with_capacity(config.sentinel_count);
    let mut rngs = Vec::with_capacity(config.sentinel_count);

    for i in 0..config.sentinel_count {
        let id = SentinelId(i as u32);
        let mut agent_rng = AgentRng::new(config.seed, AgentRef::Sentinel(id));
        let start = rng.cell(config.grid_size);
        sentinels.push(SentinelAgent::new(
            id,
            start,
            PatrolBox::quadrant(i, config.grid_size),
            config.sentinel,
            config.grid_size,
            &mut agent_rng,
        )?);
        rngs.push(agent_rng);
    }
    Ok((sentinels, rngs))
}

fn rngs_for<A: Agent>(agents: &[A], seed: u64) -> Vec<AgentRng> {
    agents.iter().map(|a| AgentRng::new(seed, a.agent_ref())).collect()
}

fn check_on_grid<A: Agent>(agents: &[A], grid_size: u32) -> SimResult<()> {
    match agents.iter().find(|a| !a.cell().in_bounds(grid_size)) {
        Some(a) => Err(SimError::OffGrid { agent: a.agent_ref(), cell: a.cell(), grid_size }),
        None => Ok(()),
    }
}
