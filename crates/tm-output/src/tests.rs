//! Integration tests for tm-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;
    use tm_agents::Anomaly;
    use tm_core::{AgentRef, AgentStatus, Cell, SentinelId, SignalId, SignalPhase, VehicleId, VehicleState};

    use crate::csv::CsvWriter;
    use crate::row::{AnomalyRow, OccupancyRow, TickStatsRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn records(dir: &TempDir, file: &str) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    fn headers(dir: &TempDir, file: &str) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("tick_stats.csv").exists());
        assert!(dir.path().join("occupancy.csv").exists());
        assert!(dir.path().join("anomalies.csv").exists());
    }

    #[test]
    fn missing_output_dir_is_created() {
        let dir = tmp();
        let nested = dir.path().join("runs").join("a");
        let mut w = CsvWriter::new(&nested).unwrap();
        w.finish().unwrap();
        assert!(nested.join("tick_stats.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            headers(&dir, "tick_stats.csv"),
            [
                "tick",
                "arrived",
                "vehicles",
                "total_waiting_time",
                "total_travel_time",
                "congestion_events",
                "incidents"
            ]
        );
        assert_eq!(headers(&dir, "occupancy.csv"), ["tick", "x", "y", "agent", "kind", "status"]);
        assert_eq!(
            headers(&dir, "anomalies.csv"),
            ["tick", "kind", "x", "y", "reporter", "severity", "vehicle", "waiting_time"]
        );
    }

    #[test]
    fn tick_stats_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let row = TickStatsRow {
            tick:               3,
            arrived:            1,
            vehicles:           4,
            total_waiting_time: 7,
            total_travel_time:  16,
            congestion_events:  2,
            incidents:          0,
        };
        w.write_tick_stats(&row).unwrap();
        w.finish().unwrap();

        let rows = records(&dir, "tick_stats.csv");
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][1], "1");
        assert_eq!(&rows[0][2], "4");
        assert_eq!(&rows[0][4], "16");
        assert_eq!(&rows[0][5], "2");
    }

    #[test]
    fn occupancy_uses_labels() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let rows = [
            OccupancyRow {
                tick:   2,
                agent:  AgentRef::Signal(SignalId(0)),
                cell:   Cell::new(1, 1),
                status: AgentStatus::Signal(SignalPhase::Green),
            },
            OccupancyRow {
                tick:   2,
                agent:  AgentRef::Vehicle(VehicleId(2)),
                cell:   Cell::new(4, 0),
                status: AgentStatus::Vehicle(VehicleState::Waiting),
            },
        ];
        w.write_occupancy(&rows).unwrap();
        w.finish().unwrap();

        let read = records(&dir, "occupancy.csv");
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].iter().collect::<Vec<_>>(), ["2", "1", "1", "TL-1", "traffic_light", "GREEN"]);
        assert_eq!(read[1].iter().collect::<Vec<_>>(), ["2", "4", "0", "V-3", "vehicle", "WAITING"]);
    }

    #[test]
    fn anomaly_columns_depend_on_kind() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let congestion = Anomaly::Congestion {
            reporter: SentinelId(1),
            cell:     Cell::new(2, 3),
            vehicles: 5,
            severity: 5,
        };
        let incident = Anomaly::Incident {
            reporter:     SentinelId(0),
            cell:         Cell::new(0, 4),
            vehicle:      VehicleId(6),
            waiting_time: 11,
        };
        w.write_anomaly(&AnomalyRow { tick: 9, anomaly: congestion }).unwrap();
        w.write_anomaly(&AnomalyRow { tick: 9, anomaly: incident }).unwrap();
        w.finish().unwrap();

        let read = records(&dir, "anomalies.csv");
        assert_eq!(read[0].iter().collect::<Vec<_>>(), ["9", "congestion", "2", "3", "D-2", "5", "", ""]);
        assert_eq!(read[1].iter().collect::<Vec<_>>(), ["9", "incident", "0", "4", "D-1", "", "V-7", "11"]);
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_occupancy_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_occupancy(&[]).unwrap();
    }
}

#[cfg(test)]
mod observer_tests {
    use tm_agents::VehicleAgent;
    use tm_core::{Cell, SimConfig, VehicleId};
    use tm_sim::SimBuilder;

    use crate::csv::CsvWriter;
    use crate::error::OutputResult;
    use crate::observer::SimOutputObserver;
    use crate::row::{AnomalyRow, OccupancyRow, TickStatsRow};
    use crate::writer::OutputWriter;
    use crate::OutputError;

    fn config(total_ticks: u64, interval: u64) -> SimConfig {
        SimConfig {
            grid_size: 5,
            vehicle_count: 1,
            sentinel_count: 0,
            total_ticks,
            output_interval_ticks: interval,
            ..SimConfig::default()
        }
    }

    #[test]
    fn integration_csv() {
        let dir = tempfile::tempdir().unwrap();
        let vehicle = VehicleAgent::new(VehicleId(0), Cell::new(0, 0), Cell::new(2, 0), 5).unwrap();
        let mut sim = SimBuilder::new(config(6, 2))
            .signals(Vec::new())
            .vehicles(vec![vehicle])
            .sentinels(Vec::new())
            .build()
            .unwrap();

        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap());
        sim.run(&mut obs);
        assert!(obs.take_error().is_none());

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_stats.csv")).unwrap();
        let stats: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(stats.len(), 6);
        assert_eq!(&stats[0][0], "0");
        assert_eq!(&stats[5][0], "5");
        assert_eq!(&stats[5][1], "1");
        assert_eq!(&stats[5][2], "1");

        // Snapshots at ticks 0, 2 and 4; only the vehicle is ever on the grid
        // and it leaves the grid once it has arrived.
        let mut rdr = csv::Reader::from_path(dir.path().join("occupancy.csv")).unwrap();
        let occupancy: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert!(!occupancy.is_empty());
        assert_eq!(&occupancy[0][0], "0");
        assert_eq!(&occupancy[0][3], "V-1");
        assert_eq!(&occupancy[0][4], "vehicle");
        assert!(occupancy.iter().all(|r| ["0", "2", "4"].contains(&&r[0])));

        let mut rdr = csv::Reader::from_path(dir.path().join("anomalies.csv")).unwrap();
        assert_eq!(rdr.records().count(), 0);
    }

    /// Fails every write after the first `ok` calls.
    struct FailingWriter {
        ok:       usize,
        calls:    usize,
        finished: bool,
    }

    impl FailingWriter {
        fn attempt(&mut self) -> OutputResult<()> {
            self.calls += 1;
            if self.calls > self.ok {
                Err(OutputError::Io(std::io::Error::other(format!("write {} refused", self.calls))))
            } else {
                Ok(())
            }
        }
    }

    impl OutputWriter for FailingWriter {
        fn write_tick_stats(&mut self, _: &TickStatsRow) -> OutputResult<()> {
            self.attempt()
        }
        fn write_occupancy(&mut self, _: &[OccupancyRow]) -> OutputResult<()> {
            self.attempt()
        }
        fn write_anomaly(&mut self, _: &AnomalyRow) -> OutputResult<()> {
            self.attempt()
        }
        fn finish(&mut self) -> OutputResult<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn first_error_is_kept() {
        let mut sim = SimBuilder::new(config(4, 0)).build().unwrap();
        let mut obs = SimOutputObserver::new(FailingWriter { ok: 1, calls: 0, finished: false });
        sim.run(&mut obs);

        let err = obs.take_error().expect("second write fails");
        assert!(err.to_string().contains("write 2 refused"));
        assert!(obs.take_error().is_none());

        // The run still completes and the writer is finished.
        let writer = obs.into_writer();
        assert!(writer.finished);
        assert_eq!(writer.calls, 4);
    }
}
