//! Integration tests for tm-sim.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tm_agents::{Agent, Anomaly, PatrolBox, SentinelAgent, SignalAgent, VehicleAgent};
use tm_core::{
    AgentKind, AgentRef, AgentRng, Cell, SentinelId, SentinelParams, SignalId, SignalPhase,
    SignalTiming, SimConfig, Tick, VehicleId, VehicleState,
};
use tm_spatial::Grid;

use crate::{topics, NoopObserver, SimBuilder, SimError, SimObserver, SimStats};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig { total_ticks, ..SimConfig::default() }
}

fn trip(id: u32, from: (i32, i32), to: (i32, i32)) -> VehicleAgent {
    VehicleAgent::new(VehicleId(id), from.into(), to.into(), 5).unwrap()
}

/// A sentinel whose patrol box is a single cell, so it never moves.
fn pinned_sentinel(cell: Cell) -> SentinelAgent {
    SentinelAgent::new(
        SentinelId(0),
        cell,
        PatrolBox::new(cell, cell),
        SentinelParams::default(),
        5,
        &mut AgentRng::from_seed(0),
    )
    .unwrap()
}

fn red_signal(cell: Cell, red: u32) -> SignalAgent {
    let timing = SignalTiming { red, ..SignalTiming::default() };
    SignalAgent::new(SignalId(0), cell, SignalPhase::Red, timing, 5).unwrap()
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn default_rosters() {
        let sim = SimBuilder::new(test_config(10)).build().unwrap();
        // 5x5 grid: lattice interval 1, signals at x, y in 1..5.
        assert_eq!(sim.signals().len(), 16);
        assert_eq!(sim.vehicles().len(), 10);
        assert_eq!(sim.sentinels().len(), 2);
        assert_eq!(sim.grid().count_kind(AgentKind::Signal), 16);
        assert_eq!(sim.grid().count_kind(AgentKind::Vehicle), 10);
        assert_eq!(sim.stats().vehicles, 10);
        assert_eq!(sim.stats().ticks, 0);
    }

    #[test]
    fn signal_lattice_spacing() {
        let config = SimConfig { grid_size: 9, ..test_config(1) };
        let sim = SimBuilder::new(config).build().unwrap();
        let cells: Vec<Cell> = sim.signals().iter().map(|s| s.cell()).collect();
        assert_eq!(
            cells,
            vec![Cell::new(3, 3), Cell::new(3, 6), Cell::new(6, 3), Cell::new(6, 6)]
        );
        assert_eq!(sim.signals()[3].id().to_string(), "TL-4");
    }

    #[test]
    fn trips_are_distinct_and_sentinels_split_quadrants() {
        let config = SimConfig { grid_size: 10, vehicle_count: 40, sentinel_count: 5, ..test_config(1) };
        let sim = SimBuilder::new(config).build().unwrap();

        for v in sim.vehicles() {
            assert_ne!(v.cell(), v.destination());
        }
        for (i, s) in sim.sentinels().iter().enumerate() {
            assert_eq!(s.patrol(), PatrolBox::quadrant(i, 10));
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let config = SimConfig { grid_size: 0, ..test_config(1) };
        assert!(matches!(SimBuilder::new(config).build(), Err(SimError::Config(_))));

        let config = SimConfig { vehicle_count: 0, ..test_config(1) };
        assert!(matches!(SimBuilder::new(config).build(), Err(SimError::Config(_))));
    }

    #[test]
    fn empty_custom_vehicle_roster_rejected() {
        let result = SimBuilder::new(test_config(1)).vehicles(Vec::new()).build();
        assert!(matches!(result, Err(SimError::EmptyRoster { what: "vehicle" })));
    }

    #[test]
    fn off_grid_roster_rejected() {
        let wide = VehicleAgent::new(VehicleId(0), Cell::new(7, 7), Cell::new(0, 0), 10).unwrap();
        let result = SimBuilder::new(test_config(1)).vehicles(vec![wide]).build();
        assert!(matches!(
            result,
            Err(SimError::OffGrid { agent: AgentRef::Vehicle(VehicleId(0)), .. })
        ));
    }
}

// ── Running ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn lone_vehicle_arrives_in_eight_ticks() {
        let mut sim = SimBuilder::new(test_config(20))
            .signals(Vec::new())
            .vehicles(vec![trip(0, (0, 0), (4, 4))])
            .sentinels(Vec::new())
            .build()
            .unwrap();

        sim.run_ticks(7, &mut NoopObserver);
        assert_eq!(sim.stats().arrived, 0);
        assert!(sim.grid().agent(AgentRef::Vehicle(VehicleId(0))).is_some());

        let stats = sim.step().clone();
        assert_eq!(stats.arrived, 1);
        assert_eq!(stats.total_travel_time, 8);
        assert_eq!(stats.total_waiting_time, 0);
        assert_eq!(sim.vehicles()[0].stops(), 0);
        assert!(sim.is_settled());
        // Arrived vehicles leave the grid.
        assert!(sim.grid().agent(AgentRef::Vehicle(VehicleId(0))).is_none());
    }

    #[test]
    fn run_stops_at_end_tick() {
        let mut sim = SimBuilder::new(test_config(10)).build().unwrap();
        sim.run(&mut NoopObserver);
        assert_eq!(sim.clock.current_tick, Tick(10));
        assert_eq!(sim.stats().ticks, 10);
        assert_eq!(sim.stats().last_tick(), Some(Tick(9)));
    }

    #[test]
    fn run_ticks_advances_clock() {
        let mut sim = SimBuilder::new(test_config(100)).build().unwrap();
        sim.run_ticks(5, &mut NoopObserver);
        assert_eq!(sim.clock.current_tick, Tick(5));
        sim.run_ticks(3, &mut NoopObserver);
        assert_eq!(sim.clock.current_tick, Tick(8));
    }

    /// Observer that counts hook calls.
    #[derive(Default)]
    struct HookCounter {
        starts:    usize,
        ends:      usize,
        snapshots: Vec<Tick>,
        finished:  Option<(Tick, SimStats)>,
    }

    impl SimObserver for HookCounter {
        fn on_tick_start(&mut self, _t: Tick) {
            self.starts += 1;
        }
        fn on_tick_end(&mut self, _t: Tick, _s: &SimStats) {
            self.ends += 1;
        }
        fn on_snapshot(&mut self, t: Tick, grid: &Grid) {
            assert_eq!(grid.size(), 5);
            self.snapshots.push(t);
        }
        fn on_sim_end(&mut self, t: Tick, s: &SimStats) {
            self.finished = Some((t, s.clone()));
        }
    }

    #[test]
    fn observer_hooks_follow_config() {
        let config = SimConfig { output_interval_ticks: 3, ..test_config(10) };
        let mut sim = SimBuilder::new(config).build().unwrap();
        let mut obs = HookCounter::default();
        sim.run(&mut obs);

        assert_eq!(obs.starts, 10);
        assert_eq!(obs.ends, 10);
        assert_eq!(obs.snapshots, vec![Tick(0), Tick(3), Tick(6), Tick(9)]);
        let (final_tick, stats) = obs.finished.unwrap();
        assert_eq!(final_tick, Tick(10));
        assert_eq!(&stats, sim.stats());
    }

    #[test]
    fn zero_interval_disables_snapshots() {
        let config = SimConfig { output_interval_ticks: 0, ..test_config(5) };
        let mut sim = SimBuilder::new(config).build().unwrap();
        let mut obs = HookCounter::default();
        sim.run(&mut obs);
        assert!(obs.snapshots.is_empty());
    }

    #[test]
    fn same_seed_same_outcome() {
        let config = SimConfig { grid_size: 8, vehicle_count: 30, sentinel_count: 4, ..test_config(120) };
        let mut a = SimBuilder::new(config.clone()).build().unwrap();
        let mut b = SimBuilder::new(config).build().unwrap();
        a.run(&mut NoopObserver);
        b.run(&mut NoopObserver);

        assert_eq!(a.stats(), b.stats());
        let cells = |s: &crate::Sim| -> Vec<Cell> {
            s.vehicles().iter().map(|v| v.cell()).collect()
        };
        assert_eq!(cells(&a), cells(&b));
    }

    #[test]
    fn path_index_monotonic_across_run() {
        let config = SimConfig { grid_size: 6, vehicle_count: 25, sentinel_count: 3, ..test_config(1) };
        let mut sim = SimBuilder::new(config).build().unwrap();
        let mut last: Vec<(usize, VehicleState)> =
            sim.vehicles().iter().map(|v| (v.path_index(), v.state())).collect();

        for _ in 0..200 {
            sim.step();
            for (v, (index, state)) in sim.vehicles().iter().zip(last.iter_mut()) {
                assert!(v.path_index() >= *index);
                assert!(v.path_index() <= v.path().len());
                if *state == VehicleState::Arrived {
                    assert_eq!(v.state(), VehicleState::Arrived);
                }
                *index = v.path_index();
                *state = v.state();
            }
            for s in sim.sentinels() {
                assert!((0.0..=100.0).contains(&s.battery()));
            }
        }
    }
}

// ── Bus and anomalies ─────────────────────────────────────────────────────────

#[cfg(test)]
mod bus_tests {
    use super::*;

    #[test]
    fn update_history_bounded_and_anomalies_drained() {
        let config = SimConfig { bus_history: 5, ..test_config(10) };
        let mut sim = SimBuilder::new(config).build().unwrap();
        sim.run(&mut NoopObserver);

        // 16 signals publish every tick; only the last five survive.
        assert_eq!(sim.bus().len(topics::SIGNAL_UPDATE), 5);
        assert_eq!(sim.bus().len(topics::SENTINEL_UPDATE), 5);
        assert_eq!(sim.bus().len(topics::ANOMALY), 0);
    }

    #[test]
    fn events_land_on_their_own_topic() {
        let mut sim = SimBuilder::new(test_config(3)).build().unwrap();
        sim.run(&mut NoopObserver);

        for topic in [topics::SIGNAL_UPDATE, topics::VEHICLE_UPDATE, topics::SENTINEL_UPDATE] {
            let messages = sim.bus().messages(topic, None);
            assert!(!messages.is_empty(), "{topic} is empty");
            assert!(messages.iter().all(|e| e.topic() == topic));
        }
    }

    #[test]
    fn subscribers_see_vehicle_updates_until_arrival() {
        let mut sim = SimBuilder::new(test_config(12))
            .signals(Vec::new())
            .vehicles(vec![trip(0, (0, 0), (4, 4))])
            .sentinels(Vec::new())
            .build()
            .unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        sim.bus_mut().subscribe(topics::VEHICLE_UPDATE, move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        sim.run(&mut NoopObserver);

        assert_eq!(seen.load(Ordering::Relaxed), 8);
    }

    #[derive(Default)]
    struct AnomalyLog(Vec<(Tick, Anomaly)>);

    impl SimObserver for AnomalyLog {
        fn on_anomaly(&mut self, t: Tick, a: &Anomaly) {
            self.0.push((t, *a));
        }
    }

    #[test]
    fn stuck_vehicle_reported_as_incident() {
        let here = Cell::new(2, 2);
        let mut sim = SimBuilder::new(test_config(12))
            .signals(vec![red_signal(here, 40)])
            .vehicles(vec![trip(0, (2, 2), (4, 2))])
            .sentinels(vec![pinned_sentinel(here)])
            .build()
            .unwrap();
        let mut log = AnomalyLog::default();
        sim.run(&mut log);

        // Waiting time after tick k is k + 1; incidents need more than 10.
        assert_eq!(sim.stats().incidents, 2);
        assert_eq!(sim.stats().congestion_events, 0);
        let ticks: Vec<Tick> = log.0.iter().map(|(t, _)| *t).collect();
        assert_eq!(ticks, vec![Tick(10), Tick(11)]);
        assert!(matches!(log.0[1].1, Anomaly::Incident { waiting_time: 12, .. }));
    }

    #[test]
    fn congestion_reaches_vehicles_one_tick_later() {
        let here = Cell::new(2, 2);
        let vehicles: Vec<VehicleAgent> = (0..8).map(|i| trip(i, (2, 2), (4, 2))).collect();
        let mut sim = SimBuilder::new(test_config(10))
            .signals(vec![red_signal(here, 2)])
            .vehicles(vehicles)
            .sentinels(vec![pinned_sentinel(here)])
            .build()
            .unwrap();

        // Tick 0: the red light holds everyone; the sentinel sees eight
        // vehicles and reports, but nobody has reacted yet.
        sim.step();
        assert_eq!(sim.stats().congestion_events, 1);
        assert_eq!(sim.pending_congestion().len(), 1);
        assert_eq!(sim.pending_congestion()[0].cell, here);
        assert_eq!(sim.pending_congestion()[0].severity, 8);
        assert!(sim.vehicles().iter().all(|v| v.waiting_time() == 1));

        // Tick 1: the light turns green for east-west traffic, so only last
        // tick's congestion report can keep a vehicle in place.
        sim.step();
        assert_eq!(sim.signals()[0].phase(), SignalPhase::Green);
        let slowed = sim
            .vehicles()
            .iter()
            .filter(|v| v.cell() == here && v.waiting_time() == 2)
            .count();
        let moved = sim.vehicles().iter().filter(|v| v.cell() != here).count();
        assert!(slowed > 0);
        assert_eq!(slowed + moved, 8);
    }
}

// ── Statistics ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stats_tests {
    use super::*;

    #[test]
    fn averages_and_percentage() {
        let stats = SimStats {
            vehicles: 4,
            arrived: 1,
            total_waiting_time: 10,
            total_travel_time: 30,
            ..SimStats::default()
        };
        assert_eq!(stats.avg_waiting_time(), 2.5);
        assert_eq!(stats.avg_travel_time(), 7.5);
        assert_eq!(stats.arrival_pct(), 25.0);
        assert!(stats.to_string().contains("1 of 4 (25.0%)"));
    }

    #[test]
    fn empty_roster_averages_are_zero() {
        let stats = SimStats::default();
        assert_eq!(stats.avg_waiting_time(), 0.0);
        assert_eq!(stats.arrival_pct(), 0.0);
        assert_eq!(stats.last_tick(), None);
    }
}
