//! Plain-text rendering of grid occupancy.
//!
//! One character per occupant: `G`/`Y`/`R` for a signal in that phase, `V`
//! for a vehicle, `D` for a drone.  Empty cells render as `·`.  Row 0 is
//! printed first.

use std::fmt::Write as _;

use tm_core::{AgentStatus, SignalPhase};
use tm_sim::Sim;
use tm_spatial::{Grid, Occupant};

fn symbol(occupant: &Occupant) -> char {
    match occupant.status {
        AgentStatus::Signal(SignalPhase::Green) => 'G',
        AgentStatus::Signal(SignalPhase::Yellow) => 'Y',
        AgentStatus::Signal(SignalPhase::Red) => 'R',
        AgentStatus::Vehicle(_) => 'V',
        AgentStatus::Sentinel(_) => 'D',
    }
}

/// Render the grid; cells are padded to the widest cell so columns align.
pub fn grid(grid: &Grid) -> String {
    let size = grid.size() as usize;
    let labels: Vec<String> = grid
        .cells()
        .map(|(_, occupants)| {
            if occupants.is_empty() {
                "·".to_owned()
            } else {
                occupants.iter().map(symbol).collect()
            }
        })
        .collect();
    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(1);

    let mut out = String::new();
    for row in labels.chunks(size.max(1)) {
        let line: Vec<String> = row.iter().map(|l| format!("{l:<width$}")).collect();
        let _ = writeln!(out, "  {}", line.join(" ").trim_end());
    }
    out
}

/// One line per drone plus the active vehicle count.
pub fn agents(sim: &Sim) -> String {
    let mut out = String::new();
    let active = sim.vehicles().iter().filter(|v| !v.has_arrived()).count();
    let _ = writeln!(out, "  vehicles active: {active} of {}", sim.vehicles().len());
    for drone in sim.sentinels() {
        let _ = writeln!(
            out,
            "  {:<5} {:<10} battery {:>5.1}%",
            drone.id().to_string(),
            drone.state().as_str(),
            drone.battery()
        );
    }
    out
}
