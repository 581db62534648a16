use crate::simulation::cell::Coord;
use crate::simulation::config::SimulationConfig;
use crate::simulation::group::{GroupId, GroupKind};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Stable handle for a herbivore or predator in the ecosystem arena.
    pub struct AnimalId;
    /// Stable handle for a patch of vegetation.
    pub struct VegetationId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeciesKind {
    Vegetation,
    Herbivore,
    Predator,
}

impl SpeciesKind {
    /// Order in which a cell's populations are visited each day.
    pub const ALL: [SpeciesKind; 3] = [Self::Vegetation, Self::Herbivore, Self::Predator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vegetation => "vegetation",
            Self::Herbivore => "herbivore",
            Self::Predator => "predator",
        }
    }

    pub fn animal(&self) -> Option<AnimalKind> {
        match self {
            Self::Vegetation => None,
            Self::Herbivore => Some(AnimalKind::Herbivore),
            Self::Predator => Some(AnimalKind::Predator),
        }
    }

    pub fn cap(&self, config: &SimulationConfig) -> usize {
        match self {
            Self::Vegetation => config.max_vegetation,
            Self::Herbivore => config.max_herbivores,
            Self::Predator => config.max_predators,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimalKind {
    Herbivore,
    Predator,
}

impl AnimalKind {
    pub fn as_str(&self) -> &'static str {
        self.species().as_str()
    }

    pub fn species(&self) -> SpeciesKind {
        match self {
            Self::Herbivore => SpeciesKind::Herbivore,
            Self::Predator => SpeciesKind::Predator,
        }
    }

    pub fn group_kind(&self) -> GroupKind {
        match self {
            Self::Herbivore => GroupKind::Herd,
            Self::Predator => GroupKind::Pride,
        }
    }
}

// ─── Vegetation ───

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vegetation {
    pub density: f32,
    pub cell: Coord,
}

impl Vegetation {
    pub fn new(cell: Coord, density: f32) -> Self {
        Self { density, cell }
    }

    /// Returns true if the density actually changed.
    pub fn grow(&mut self, amount: f32, max_density: f32) -> bool {
        if self.density >= max_density {
            return false;
        }
        self.density = (self.density + amount).min(max_density);
        true
    }

    pub fn is_saturated(&self, max_density: f32) -> bool {
        self.density >= max_density
    }

    /// One bite. Returns false when there is nothing left to eat.
    pub fn graze(&mut self) -> bool {
        if self.density <= 0.0 {
            return false;
        }
        self.density = (self.density - 1.0).max(0.0);
        true
    }
}

// ─── Animals ───

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    pub kind: AnimalKind,
    pub energy: i32,
    pub lifetime: u32,
    pub age: u32,
    pub social_attitude: f32,
    pub cell: Coord,
    pub group: Option<GroupId>,
}

impl Animal {
    pub fn new(kind: AnimalKind, cell: Coord, energy: i32, lifetime: u32, social_attitude: f32) -> Self {
        Self {
            kind,
            energy,
            lifetime,
            age: 0,
            social_attitude,
            cell,
            group: None,
        }
    }

    /// A newborn with energy, lifetime and social attitude drawn uniformly.
    pub fn random(kind: AnimalKind, cell: Coord, config: &SimulationConfig, rng: &mut impl Rng) -> Self {
        Self::new(
            kind,
            cell,
            rng.gen_range(1..=config.max_energy),
            rng.gen_range(1..=config.max_life),
            rng.gen_range(0.0..=1.0),
        )
    }

    /// Adds a day of age and pays the periodic aging cost.
    pub fn grow_older(&mut self, config: &SimulationConfig) {
        self.age += 1;
        if self.age % config.aging_interval == 0 {
            self.energy -= config.aging;
        }
    }

    pub fn reached_lifetime(&self) -> bool {
        self.age >= self.lifetime
    }

    pub fn is_exhausted(&self) -> bool {
        self.energy < 1
    }

    pub fn gain_energy(&mut self, amount: i32, max_energy: i32) {
        self.energy = (self.energy + amount).min(max_energy);
    }
}
