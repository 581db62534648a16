pub mod simulation;

use simulation::config::{ConfigError, SimulationConfig};
use simulation::SimulationState;
use std::path::Path;

/// Loads the configuration, falling back to defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<SimulationConfig, ConfigError> {
    match path {
        Some(p) => {
            let config = SimulationConfig::from_json_file(p)?;
            log::info!("Loaded config from {:?}", p);
            Ok(config)
        }
        None => Ok(SimulationConfig::default()),
    }
}

/// Runs `days` days without a renderer and returns the final state.
/// Stops early once every animal is gone.
pub fn run_headless(config: SimulationConfig, days: u64) -> SimulationState {
    let mut sim = SimulationState::new(config);
    log::info!(
        "Savanna initialized on a {}x{} grid, running {} day(s)",
        sim.config().rows,
        sim.config().cols,
        days
    );

    for _ in 0..days {
        let report = sim.step();
        let p = report.populations;
        log::info!(
            "day {:>4}: vegetation={} herbivores={} predators={}",
            report.day,
            p.vegetation,
            p.herbivores,
            p.predators
        );
        if p.herbivores == 0 && p.predators == 0 {
            log::info!("No animals left after day {}", report.day);
            break;
        }
    }
    sim
}
