pub mod cell;
pub mod config;
pub mod ecosystem;
pub mod group;
pub mod species;

use cell::{Coord, Terrain};
use config::SimulationConfig;
use ecosystem::{Ecosystem, PopulationCounts, SimEvent};
use serde::{Deserialize, Serialize};

/// Result of advancing the world by one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayReport {
    pub day: u64,
    pub populations: PopulationCounts,
    pub events: Vec<SimEvent>,
}

/// Per-cell view handed to renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellState {
    pub row: usize,
    pub col: usize,
    pub terrain: Terrain,
    pub density: Option<f32>,
    pub herbivores: u32,
    pub predators: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldFrame {
    pub day: u64,
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<CellState>,
    pub populations: PopulationCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub day: u64,
    pub vegetation: usize,
    pub herbivores: usize,
    pub predators: usize,
}

/// Population counts per day, the series behind the population chart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationHistory {
    pub snapshots: Vec<PopulationSnapshot>,
}

impl PopulationHistory {
    pub fn record(&mut self, day: u64, counts: PopulationCounts) {
        self.snapshots.push(PopulationSnapshot {
            day,
            vegetation: counts.vegetation,
            herbivores: counts.herbivores,
            predators: counts.predators,
        });
    }

    pub fn latest(&self) -> Option<&PopulationSnapshot> {
        self.snapshots.last()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

/// Top-level simulation state driven by a renderer or the headless runner
pub struct SimulationState {
    pub day: u64,
    pub paused: bool,
    pub ecosystem: Ecosystem,
    pub history: PopulationHistory,
}

impl SimulationState {
    /// Starts running rather than paused, so headless callers can step right
    /// away. A renderer that wants to open paused calls [`Self::pause`] first.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            day: 0,
            paused: false,
            ecosystem: Ecosystem::new(config),
            history: PopulationHistory::default(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.ecosystem.config
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Advances one day unless paused.
    pub fn step(&mut self) -> DayReport {
        if self.paused {
            return DayReport {
                day: self.day,
                populations: self.ecosystem.population_counts(),
                events: Vec::new(),
            };
        }

        self.day += 1;
        let events = self.ecosystem.live_day();
        let populations = self.ecosystem.population_counts();
        self.history.record(self.day, populations);

        log::debug!(
            "day {}: {} vegetation, {} herbivores, {} predators, {} groups",
            self.day,
            populations.vegetation,
            populations.herbivores,
            populations.predators,
            self.ecosystem.group_ids().len(),
        );

        DayReport { day: self.day, populations, events }
    }

    /// Regenerates the world and starts over, paused, from day zero.
    pub fn reset(&mut self) {
        self.ecosystem.generate();
        self.day = 0;
        self.history.clear();
        self.paused = true;
        log::info!("Simulation reset");
    }

    pub fn build_frame(&self) -> WorldFrame {
        let grid = self.ecosystem.grid();
        WorldFrame {
            day: self.day,
            rows: grid.rows(),
            cols: grid.cols(),
            cells: grid
                .cells()
                .map(|c| CellState {
                    row: c.coord.row,
                    col: c.coord.col,
                    terrain: c.terrain,
                    density: self.ecosystem.density_at(c.coord),
                    herbivores: c.herbivores.len() as u32,
                    predators: c.predators.len() as u32,
                })
                .collect(),
            populations: self.ecosystem.population_counts(),
        }
    }

    pub fn cell_state(&self, coord: Coord) -> Option<CellState> {
        let c = self.ecosystem.cell(coord)?;
        Some(CellState {
            row: coord.row,
            col: coord.col,
            terrain: c.terrain,
            density: self.ecosystem.density_at(coord),
            herbivores: c.herbivores.len() as u32,
            predators: c.predators.len() as u32,
        })
    }
}
