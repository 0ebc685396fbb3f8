//! The `Sim` struct and its tick loop.

use tm_agents::{
    Agent, Anomaly, AxisCounts, CongestionReport, SentinelAgent, SentinelEnv, SignalAgent,
    SignalEnv, SignalSnapshot, VehicleAgent, VehicleEnv, VehicleSnapshot,
};
use tm_bus::EventBus;
use tm_core::{AgentRng, SimClock, SimConfig, Tick};
use tm_spatial::Grid;
use tracing::{debug, info};

use crate::events::topics;
use crate::{BusEvent, NoopObserver, SimObserver, SimStats};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// Each tick runs six phases in a fixed order:
///
/// 1. **Signals**: every signal steps with the axis counts of vehicles
///    around it (as of the end of the previous tick) and publishes its state.
/// 2. **Vehicles** (optionally parallel): every non-arrived vehicle steps
///    against this tick's signal states and the congestion reports drained
///    at the end of the *previous* tick, then publishes its state.
/// 3. **Sentinels** (optionally parallel): every sentinel steps against the
///    active vehicles as they stand after phase 2; queued anomalies are then
///    published, followed by the sentinel's state.
/// 4. **Anomalies**: the anomaly topic is drained into the counters and
///    becomes next tick's congestion view.  Update topics keep their bounded
///    history for external observers.
/// 5. **Grid**: occupancy is rebuilt from every agent's current cell.
/// 6. **Statistics**: vehicle totals are recomputed over the full roster.
///
/// The congestion hand-over in phase 4 is what gives vehicles their one-tick
/// lag behind the sentinels.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Global configuration (grid size, rosters, total ticks, seed, …).
    pub config: SimConfig,

    /// Simulation clock; `current_tick` is the tick that runs next.
    pub clock: SimClock,

    pub(crate) signals:   Vec<SignalAgent>,
    pub(crate) vehicles:  Vec<VehicleAgent>,
    pub(crate) sentinels: Vec<SentinelAgent>,

    /// Per-agent deterministic RNGs, parallel to the rosters, kept apart for
    /// the split-borrow pattern.
    pub(crate) signal_rngs:   Vec<AgentRng>,
    pub(crate) vehicle_rngs:  Vec<AgentRng>,
    pub(crate) sentinel_rngs: Vec<AgentRng>,

    pub(crate) bus:  EventBus<BusEvent>,
    pub(crate) grid: Grid,

    /// Congestion drained from the bus at the end of the last tick.
    pub(crate) congestion: Vec<CongestionReport>,

    pub(crate) stats: SimStats,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        while self.clock.current_tick < self.config.end_tick() {
            self.tick(observer);
        }
        info!(
            ticks = self.stats.ticks,
            arrived = self.stats.arrived,
            vehicles = self.stats.vehicles,
            congestion_events = self.stats.congestion_events,
            incidents = self.stats.incidents,
            "simulation finished"
        );
        observer.on_sim_end(self.clock.current_tick, &self.stats);
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.tick(observer);
        }
    }

    /// Advance one tick with no observer.
    pub fn step(&mut self) -> &SimStats {
        self.tick(&mut NoopObserver);
        &self.stats
    }

    #[inline]
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Occupancy as of the end of the last tick.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn bus(&self) -> &EventBus<BusEvent> {
        &self.bus
    }

    /// Mutable bus access, e.g. to subscribe an external listener.
    #[inline]
    pub fn bus_mut(&mut self) -> &mut EventBus<BusEvent> {
        &mut self.bus
    }

    #[inline]
    pub fn signals(&self) -> &[SignalAgent] {
        &self.signals
    }

    #[inline]
    pub fn vehicles(&self) -> &[VehicleAgent] {
        &self.vehicles
    }

    #[inline]
    pub fn sentinels(&self) -> &[SentinelAgent] {
        &self.sentinels
    }

    /// Congestion reports vehicles will see during the next tick.
    #[inline]
    pub fn pending_congestion(&self) -> &[CongestionReport] {
        &self.congestion
    }

    /// `true` once every vehicle has arrived.
    pub fn is_settled(&self) -> bool {
        self.vehicles.iter().all(VehicleAgent::has_arrived)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn tick<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        let anomalies = self.process_tick(now);
        for anomaly in &anomalies {
            observer.on_anomaly(now, anomaly);
        }

        observer.on_tick_end(now, &self.stats);
        if now.is_multiple_of(self.config.output_interval_ticks) {
            observer.on_snapshot(now, &self.grid);
        }
        self.clock.advance();
    }

    /// Run the six phases for tick `now`; returns the anomalies drained this
    /// tick in publication order.
    fn process_tick(&mut self, now: Tick) -> Vec<Anomaly> {
        self.signal_phase();
        self.vehicle_phase();
        self.sentinel_phase();
        let anomalies = self.absorb_anomalies(now);
        self.rebuild_grid();
        self.stats.ticks = now.0 + 1;
        self.refresh_stats();
        anomalies
    }

    // ── Phase 1: signals ──────────────────────────────────────────────────

    fn signal_phase(&mut self) {
        let vehicles: Vec<VehicleSnapshot> = self.vehicles.iter().map(Agent::snapshot).collect();

        for (signal, rng) in self.signals.iter_mut().zip(self.signal_rngs.iter_mut()) {
            let env = SignalEnv::with_counts(AxisCounts::around(signal.cell(), &vehicles));
            signal.step(&env, rng);
            publish(&mut self.bus, BusEvent::Signal(signal.snapshot()));
        }
    }

    // ── Phase 2: vehicles ─────────────────────────────────────────────────

    fn vehicle_phase(&mut self) {
        let signals: Vec<SignalSnapshot> = self.signals.iter().map(Agent::snapshot).collect();
        let active: Vec<bool> = self.vehicles.iter().map(|v| !v.has_arrived()).collect();

        // Explicit field borrows so the borrow checker sees disjoint access.
        let env = VehicleEnv::new(&signals, &self.congestion);
        step_phase(&mut self.vehicles, &mut self.vehicle_rngs, |v, rng| {
            if !v.has_arrived() {
                v.step(&env, rng);
            }
        });

        for (vehicle, _) in self.vehicles.iter().zip(active).filter(|(_, was_active)| *was_active) {
            publish(&mut self.bus, BusEvent::Vehicle(vehicle.snapshot()));
        }
    }

    // ── Phase 3: sentinels ────────────────────────────────────────────────

    fn sentinel_phase(&mut self) {
        let active: Vec<VehicleSnapshot> = self
            .vehicles
            .iter()
            .filter(|v| !v.has_arrived())
            .map(Agent::snapshot)
            .collect();

        let env = SentinelEnv::new(&active);
        step_phase(&mut self.sentinels, &mut self.sentinel_rngs, |s, rng| s.step(&env, rng));

        // Publication is sequential so subscriber callbacks never race.
        for sentinel in &mut self.sentinels {
            for anomaly in sentinel.drain_anomalies() {
                publish(&mut self.bus, BusEvent::Anomaly(anomaly));
            }
            publish(&mut self.bus, BusEvent::Sentinel(sentinel.snapshot()));
        }
    }

    // ── Phase 4: anomalies ────────────────────────────────────────────────

    fn absorb_anomalies(&mut self, now: Tick) -> Vec<Anomaly> {
        let anomalies: Vec<Anomaly> = self
            .bus
            .drain(topics::ANOMALY)
            .into_iter()
            .filter_map(|event| event.as_anomaly().copied())
            .collect();

        self.congestion.clear();
        for anomaly in &anomalies {
            match anomaly.as_congestion() {
                Some(report) => {
                    self.stats.congestion_events += 1;
                    self.congestion.push(report);
                }
                None => self.stats.incidents += 1,
            }
        }
        if !anomalies.is_empty() {
            debug!(
                tick = %now,
                anomalies = anomalies.len(),
                congested_cells = self.congestion.len(),
                "anomalies absorbed"
            );
        }
        anomalies
    }

    // ── Phases 5 and 6: read models ───────────────────────────────────────

    /// Rebuild occupancy from every signal, every active vehicle and every
    /// sentinel.
    pub(crate) fn rebuild_grid(&mut self) {
        self.grid.clear();
        for s in &self.signals {
            self.grid.add_agent(s.agent_ref(), s.cell(), s.status());
        }
        for v in self.vehicles.iter().filter(|v| !v.has_arrived()) {
            self.grid.add_agent(v.agent_ref(), v.cell(), v.status());
        }
        for d in &self.sentinels {
            self.grid.add_agent(d.agent_ref(), d.cell(), d.status());
        }
    }

    pub(crate) fn refresh_stats(&mut self) {
        let s = &mut self.stats;
        s.signals = self.signals.len();
        s.vehicles = self.vehicles.len();
        s.sentinels = self.sentinels.len();
        s.arrived = 0;
        s.total_waiting_time = 0;
        s.total_travel_time = 0;
        for v in &self.vehicles {
            if v.has_arrived() {
                s.arrived += 1;
            }
            s.total_waiting_time += u64::from(v.waiting_time());
            s.total_travel_time += u64::from(v.total_travel_time());
        }
    }
}

/// Publish `event` on the topic its variant belongs to.
fn publish(bus: &mut EventBus<BusEvent>, event: BusEvent) {
    let topic = event.topic();
    bus.publish(topic, event);
}

/// Step every agent of one roster alongside its RNG.
///
/// With the `parallel` Cargo feature the roster is split across Rayon's
/// thread pool.  `step` only sees the agent, its own RNG and whatever
/// immutable environment it captured, so the outcome is identical.
fn step_phase<A, F>(agents: &mut [A], rngs: &mut [AgentRng], step: F)
where
    A: Send,
    F: Fn(&mut A, &mut AgentRng) + Send + Sync,
{
    #[cfg(not(feature = "parallel"))]
    {
        agents.iter_mut().zip(rngs.iter_mut()).for_each(|(a, rng)| step(a, rng));
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        agents
            .par_iter_mut()
            .zip(rngs.par_iter_mut())
            .for_each(|(a, rng)| step(a, rng));
    }
}
