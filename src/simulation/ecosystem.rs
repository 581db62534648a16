use crate::simulation::cell::{self, Cell, Coord, Grid, Terrain};
use crate::simulation::config::SimulationConfig;
use crate::simulation::group::{Group, GroupId, GroupKind};
use crate::simulation::species::{Animal, AnimalId, AnimalKind, SpeciesKind, Vegetation, VegetationId};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::BTreeSet;

// ─── Simulation Events ───

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Birth { animal: AnimalId, kind: AnimalKind, parent: AnimalId },
    Death { animal: AnimalId, kind: AnimalKind, cause: DeathCause },
    GroupFormed { group: GroupId, kind: GroupKind, size: usize },
    GroupMerged { survivor: GroupId, absorbed: GroupId, kind: GroupKind },
    GroupMoved { group: GroupId, from: Coord, to: Coord },
    PrideConflict { winner: GroupId, losers: Vec<GroupId> },
    Hunt { pride: GroupId, prey: AnimalId, energy: i32 },
    Overwhelm { cell: Coord, victims: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    OldAge,
    Starvation,
    Overwhelmed,
    Predation,
    Conflict,
}

// ─── Population index ───

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub vegetation: usize,
    pub herbivores: usize,
    pub predators: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Population {
    pub vegetation: BTreeSet<VegetationId>,
    pub herbivores: BTreeSet<AnimalId>,
    pub predators: BTreeSet<AnimalId>,
}

impl Population {
    fn animals_mut(&mut self, kind: AnimalKind) -> &mut BTreeSet<AnimalId> {
        match kind {
            AnimalKind::Herbivore => &mut self.herbivores,
            AnimalKind::Predator => &mut self.predators,
        }
    }

    pub fn count(&self, kind: SpeciesKind) -> usize {
        match kind {
            SpeciesKind::Vegetation => self.vegetation.len(),
            SpeciesKind::Herbivore => self.herbivores.len(),
            SpeciesKind::Predator => self.predators.len(),
        }
    }
}

// ─── Ecosystem ───

/// Owns the grid, every entity and group, and the global population index.
/// Entities and groups live in generational arenas; cells and groups refer to
/// them by handle, so a removed entity leaves only stale handles behind.
pub struct Ecosystem {
    pub config: SimulationConfig,
    pub(super) grid: Grid,
    pub(super) animals: SlotMap<AnimalId, Animal>,
    pub(super) vegetation: SlotMap<VegetationId, Vegetation>,
    pub(super) groups: SlotMap<GroupId, Group>,
    pub(super) population: Population,
    pub(super) group_order: Vec<GroupId>,
    pub(super) rng: StdRng,
    pub(super) events: Vec<SimEvent>,
}

impl Ecosystem {
    /// Builds and populates a fresh random world.
    pub fn new(config: SimulationConfig) -> Self {
        let mut eco = Self::with_terrain(config, |_| Terrain::Water);
        eco.generate();
        eco
    }

    /// An unpopulated world whose terrain comes from `terrain`.
    ///
    /// `config` is expected to pass [`SimulationConfig::validate`]; zero energy or
    /// lifetime caps would make newborn sampling panic.
    pub fn with_terrain(config: SimulationConfig, terrain: impl FnMut(Coord) -> Terrain) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid config: {:?}", config.validate());
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            grid: Grid::new(config.rows, config.cols, terrain),
            config,
            animals: SlotMap::with_key(),
            vegetation: SlotMap::with_key(),
            groups: SlotMap::with_key(),
            population: Population::default(),
            group_order: Vec::new(),
            rng,
            events: Vec::new(),
        }
    }

    /// Rebuilds the world from scratch: water boundary, random interior
    /// terrain, and at most one spawned entity per ground cell.
    pub fn generate(&mut self) {
        self.animals.clear();
        self.vegetation.clear();
        self.groups.clear();
        self.population = Population::default();
        self.group_order.clear();
        self.events.clear();

        let (rows, cols) = (self.config.rows, self.config.cols);
        let rng = &mut self.rng;
        self.grid = Grid::new(rows, cols, |c| {
            if cell::is_boundary(c, rows, cols) || rng.gen_bool(0.5) {
                Terrain::Water
            } else {
                Terrain::Ground
            }
        });

        for coord in self.grid.coords() {
            if self.grid.get(coord).is_some_and(|c| !c.is_water()) {
                self.spawn_initial(coord);
            }
        }

        let counts = self.population_counts();
        log::info!(
            "Generated {}x{} world: {} vegetation, {} herbivores, {} predators",
            rows,
            cols,
            counts.vegetation,
            counts.herbivores,
            counts.predators,
        );
    }

    fn spawn_initial(&mut self, coord: Coord) {
        // Caps are checked with <=, so the last spawn may overshoot by one
        let available: Vec<SpeciesKind> = [SpeciesKind::Herbivore, SpeciesKind::Vegetation, SpeciesKind::Predator]
            .into_iter()
            .filter(|k| self.population.count(*k) <= k.cap(&self.config))
            .collect();
        let Some(&kind) = available.choose(&mut self.rng) else {
            return;
        };
        match kind.animal() {
            None => {
                self.spawn_vegetation(coord, self.config.initial_density);
            }
            Some(animal_kind) => {
                let animal = Animal::random(animal_kind, coord, &self.config, &mut self.rng);
                self.spawn_animal(animal);
            }
        }
    }

    pub fn spawn_vegetation(&mut self, coord: Coord, density: f32) -> VegetationId {
        let id = self.vegetation.insert(Vegetation::new(coord, density));
        self.population.vegetation.insert(id);
        if let Some(cell) = self.grid.get_mut(coord) {
            cell.vegetation.push(id);
        }
        self.refresh_appeal(coord);
        id
    }

    /// Registers `animal` in its cell and in the global index.
    pub fn spawn_animal(&mut self, animal: Animal) -> AnimalId {
        let (kind, coord) = (animal.kind, animal.cell);
        debug_assert!(self.grid.get(coord).is_some_and(|c| !c.is_water()), "spawning onto water");
        let id = self.animals.insert(animal);
        self.population.animals_mut(kind).insert(id);
        if let Some(cell) = self.grid.get_mut(coord) {
            cell.animals_mut(kind).push(id);
        }
        self.refresh_appeal(coord);
        id
    }

    /// Removes an animal from its cell, its group and the global index.
    /// Stale handles are ignored.
    pub fn remove_animal(&mut self, id: AnimalId, cause: DeathCause) -> bool {
        let Some(animal) = self.animals.remove(id) else {
            return false;
        };
        if let Some(cell) = self.grid.get_mut(animal.cell) {
            cell.animals_mut(animal.kind).retain(|a| *a != id);
        }
        self.refresh_appeal(animal.cell);
        self.population.animals_mut(animal.kind).remove(&id);
        if let Some(group) = animal.group.and_then(|g| self.groups.get_mut(g)) {
            group.remove_member(id);
        }

        log::trace!("{} {:?} died: {:?}", animal.kind.as_str(), id, cause);
        self.events.push(SimEvent::Death { animal: id, kind: animal.kind, cause });
        true
    }

    /// Recomputes the appeal of `coord` from its current occupants.
    pub fn refresh_appeal(&mut self, coord: Coord) {
        let Some(cell) = self.grid.get_mut(coord) else {
            return;
        };
        let density = cell.vegetation.first().and_then(|v| self.vegetation.get(*v)).map(|v| v.density);
        cell.recompute_appeal(density, &self.config);
    }

    // ─── Day cycle ───

    /// Advances the world by one day and returns what happened.
    pub fn live_day(&mut self) -> Vec<SimEvent> {
        // Phase 1: every entity present when its population slot is reached
        for coord in self.grid.coords() {
            for kind in SpeciesKind::ALL {
                let Some(cell) = self.grid.get(coord) else {
                    continue;
                };
                match kind.animal() {
                    None => {
                        for id in cell.vegetation.clone() {
                            self.vegetation_first_phase(id);
                        }
                    }
                    Some(animal_kind) => {
                        for id in cell.animals(animal_kind).to_vec() {
                            self.animal_first_phase(id);
                        }
                    }
                }
            }
        }

        // Phase 2: groups in formation order; dissolved ones are skipped
        for gid in self.group_order.clone() {
            self.group_live_day(gid);
        }

        self.events.drain(..).collect()
    }

    fn vegetation_first_phase(&mut self, id: VegetationId) {
        let (growing, max_density) = (self.config.growing, self.config.max_density);
        let Some(veg) = self.vegetation.get_mut(id) else {
            return;
        };
        let coord = veg.cell;
        if veg.grow(growing, max_density) {
            self.refresh_appeal(coord);
        }
        if self.is_overwhelmed(coord) {
            self.overwhelm(coord);
        }
    }

    /// A cell is overwhelmed when at least one neighbor carries vegetation
    /// and every such neighbor is at full density.
    pub fn is_overwhelmed(&self, coord: Coord) -> bool {
        let max_density = self.config.max_density;
        let mut vegetated = 0;
        for &n in self.grid.neighbors(coord) {
            let first = self
                .grid
                .get(n)
                .and_then(|c| c.vegetation.first())
                .and_then(|v| self.vegetation.get(*v));
            if let Some(veg) = first {
                if !veg.is_saturated(max_density) {
                    return false;
                }
                vegetated += 1;
            }
        }
        vegetated > 0
    }

    fn overwhelm(&mut self, coord: Coord) {
        let victims: Vec<AnimalId> = match self.grid.get(coord) {
            Some(cell) if cell.has_animals() => cell.herbivores.iter().chain(cell.predators.iter()).copied().collect(),
            _ => return,
        };
        for &v in &victims {
            self.remove_animal(v, DeathCause::Overwhelmed);
        }
        log::debug!("vegetation overwhelmed {} animal(s) at {:?}", victims.len(), coord);
        self.events.push(SimEvent::Overwhelm { cell: coord, victims: victims.len() });
    }

    fn animal_first_phase(&mut self, id: AnimalId) {
        let Some(animal) = self.animals.get_mut(id) else {
            return;
        };
        animal.grow_older(&self.config);
        if animal.group.is_none() {
            self.form_group(id);
        }

        let Some(animal) = self.animals.get(id) else {
            return;
        };
        if animal.reached_lifetime() {
            self.reproduce(id);
            self.reproduce(id);
            self.remove_animal(id, DeathCause::OldAge);
        } else if animal.is_exhausted() {
            self.remove_animal(id, DeathCause::Starvation);
        }
    }

    /// Spawns one offspring next to `parent` if both its group and its
    /// species have room.
    pub fn reproduce(&mut self, parent: AnimalId) -> Option<AnimalId> {
        let animal = self.animals.get(parent)?;
        let (kind, coord) = (animal.kind, animal.cell);
        let group_size = animal.group.and_then(|g| self.groups.get(g)).map_or(0, |g| g.len());
        if group_size >= self.config.max_group {
            return None;
        }
        if self.population.count(kind.species()) >= kind.species().cap(&self.config) {
            return None;
        }
        let child = Animal::random(kind, coord, &self.config, &mut self.rng);
        let id = self.spawn_animal(child);
        self.events.push(SimEvent::Birth { animal: id, kind, parent });
        Some(id)
    }

    // ─── Movement ───

    /// The neighbor this animal would move to, or its own cell. The current
    /// cell gets a stay bonus; later neighbors win ties; water never wins.
    pub fn best_cell_for(&self, id: AnimalId) -> Option<Coord> {
        let animal = self.animals.get(id)?;
        let (kind, current) = (animal.kind, animal.cell);
        let mut best = current;
        for &n in self.grid.neighbors(current) {
            let Some(best_cell) = self.grid.get(best) else {
                continue;
            };
            let threshold = if best == current {
                best_cell.appeal(kind) + self.config.stay_bonus
            } else {
                best_cell.appeal(kind)
            };
            let Some(candidate) = self.grid.get(n) else {
                continue;
            };
            if candidate.appeal(kind) >= threshold && !candidate.is_water() {
                best = n;
            }
        }
        Some(best)
    }

    pub fn decides_to_move(&self, id: AnimalId) -> bool {
        let Some(animal) = self.animals.get(id) else {
            return false;
        };
        if animal.energy < self.config.min_move_energy {
            return false;
        }
        self.best_cell_for(id).is_some_and(|best| best != animal.cell)
    }

    /// Steps an animal into `target` for one energy point.
    pub fn move_animal(&mut self, id: AnimalId, target: Coord) -> bool {
        let target_is_ground = self.grid.get(target).is_some_and(|c| !c.is_water());
        debug_assert!(target_is_ground, "animals never move onto water");
        if !target_is_ground {
            return false;
        }
        let Some(animal) = self.animals.get_mut(id) else {
            return false;
        };
        let (kind, from) = (animal.kind, animal.cell);
        animal.energy -= 1;
        animal.cell = target;

        if let Some(cell) = self.grid.get_mut(from) {
            cell.animals_mut(kind).retain(|a| *a != id);
        }
        self.refresh_appeal(from);
        if let Some(cell) = self.grid.get_mut(target) {
            cell.animals_mut(kind).push(id);
        }
        self.refresh_appeal(target);
        true
    }

    /// One herbivore bite from the cell's first vegetation.
    pub fn graze(&mut self, id: AnimalId) -> bool {
        let Some(animal) = self.animals.get(id) else {
            return false;
        };
        if animal.kind != AnimalKind::Herbivore {
            return false;
        }
        let coord = animal.cell;
        let Some(veg_id) = self.grid.get(coord).and_then(|c| c.vegetation.first().copied()) else {
            return false;
        };
        let grazed = self.vegetation.get_mut(veg_id).is_some_and(|v| v.graze());
        if !grazed {
            return false;
        }
        let max_energy = self.config.max_energy;
        if let Some(animal) = self.animals.get_mut(id) {
            animal.gain_energy(1, max_energy);
        }
        self.refresh_appeal(coord);
        true
    }

    // ─── Read access ───

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.grid.get(coord)
    }

    pub fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.animals.get(id)
    }

    pub fn vegetation(&self, id: VegetationId) -> Option<&Vegetation> {
        self.vegetation.get(id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    /// Registered groups in formation order.
    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_order
    }

    pub fn population(&self, kind: SpeciesKind) -> Vec<AnimalId> {
        match kind {
            SpeciesKind::Vegetation => Vec::new(),
            SpeciesKind::Herbivore => self.population.herbivores.iter().copied().collect(),
            SpeciesKind::Predator => self.population.predators.iter().copied().collect(),
        }
    }

    pub fn population_count(&self, kind: SpeciesKind) -> usize {
        self.population.count(kind)
    }

    pub fn population_counts(&self) -> PopulationCounts {
        PopulationCounts {
            vegetation: self.population.count(SpeciesKind::Vegetation),
            herbivores: self.population.count(SpeciesKind::Herbivore),
            predators: self.population.count(SpeciesKind::Predator),
        }
    }

    /// Density of the first vegetation in `coord`, if any.
    pub fn density_at(&self, coord: Coord) -> Option<f32> {
        let id = self.grid.get(coord)?.vegetation.first()?;
        self.vegetation.get(*id).map(|v| v.density)
    }
}
