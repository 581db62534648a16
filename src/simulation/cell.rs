use crate::simulation::config::SimulationConfig;
use crate::simulation::group::{GroupId, GroupKind};
use crate::simulation::species::{AnimalId, AnimalKind, VegetationId};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    Water,
    Ground,
}

/// One grid square. Membership lists keep insertion order so that every
/// iteration over a cell's population is reproducible.
#[derive(Debug, Clone)]
pub struct Cell {
    pub coord: Coord,
    pub terrain: Terrain,
    pub prey_appeal: f32,
    pub predator_appeal: f32,
    pub vegetation: Vec<VegetationId>,
    pub herbivores: Vec<AnimalId>,
    pub predators: Vec<AnimalId>,
    pub herds: Vec<GroupId>,
    pub prides: Vec<GroupId>,
    neighbors: OnceCell<Vec<Coord>>,
}

impl Cell {
    pub fn new(coord: Coord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            prey_appeal: 0.0,
            predator_appeal: 0.0,
            vegetation: Vec::new(),
            herbivores: Vec::new(),
            predators: Vec::new(),
            herds: Vec::new(),
            prides: Vec::new(),
            neighbors: OnceCell::new(),
        }
    }

    pub fn is_water(&self) -> bool {
        self.terrain == Terrain::Water
    }

    pub fn appeal(&self, kind: AnimalKind) -> f32 {
        match kind {
            AnimalKind::Herbivore => self.prey_appeal,
            AnimalKind::Predator => self.predator_appeal,
        }
    }

    pub fn animals(&self, kind: AnimalKind) -> &[AnimalId] {
        match kind {
            AnimalKind::Herbivore => &self.herbivores,
            AnimalKind::Predator => &self.predators,
        }
    }

    pub fn animals_mut(&mut self, kind: AnimalKind) -> &mut Vec<AnimalId> {
        match kind {
            AnimalKind::Herbivore => &mut self.herbivores,
            AnimalKind::Predator => &mut self.predators,
        }
    }

    pub fn groups(&self, kind: GroupKind) -> &[GroupId] {
        match kind {
            GroupKind::Herd => &self.herds,
            GroupKind::Pride => &self.prides,
        }
    }

    pub fn groups_mut(&mut self, kind: GroupKind) -> &mut Vec<GroupId> {
        match kind {
            GroupKind::Herd => &mut self.herds,
            GroupKind::Pride => &mut self.prides,
        }
    }

    pub fn has_animals(&self) -> bool {
        !self.herbivores.is_empty() || !self.predators.is_empty()
    }

    /// Rebuild both appeal scores from the current occupants. `density` is the
    /// density of the cell's first vegetation, if it has any.
    pub fn recompute_appeal(&mut self, density: Option<f32>, config: &SimulationConfig) {
        let herbivores = self.herbivores.len() as f32;
        let predators = self.predators.len() as f32;

        self.prey_appeal = density.unwrap_or(0.0);
        self.predator_appeal = 0.0;

        self.prey_appeal -= herbivores * config.herbivore_prey_penalty;
        self.predator_appeal += herbivores * config.herbivore_predator_bonus;

        self.prey_appeal -= predators * config.predator_prey_penalty;
        self.predator_appeal -= predators * config.predator_predator_penalty;
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, mut terrain: impl FnMut(Coord) -> Terrain) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let coord = Coord::new(row, col);
                cells.push(Cell::new(coord, terrain(coord)));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_boundary(&self, coord: Coord) -> bool {
        is_boundary(coord, self.rows, self.cols)
    }

    #[inline]
    fn index(&self, coord: Coord) -> usize {
        coord.row * self.cols + coord.col
    }

    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        if coord.row < self.rows && coord.col < self.cols {
            Some(&self.cells[self.index(coord)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        if coord.row < self.rows && coord.col < self.cols {
            let idx = self.index(coord);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> Vec<Coord> {
        self.cells.iter().map(|c| c.coord).collect()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// The up to eight surrounding cells, row-major within the 3x3 block with
    /// the center skipped. Computed on first use and cached on the cell.
    pub fn neighbors(&self, coord: Coord) -> &[Coord] {
        let (rows, cols) = (self.rows, self.cols);
        match self.get(coord) {
            Some(cell) => cell.neighbors.get_or_init(|| surrounding(coord, rows, cols)).as_slice(),
            None => &[],
        }
    }
}

/// True for cells on the outer ring of a `rows` x `cols` grid.
pub fn is_boundary(coord: Coord, rows: usize, cols: usize) -> bool {
    coord.row == 0 || coord.col == 0 || coord.row + 1 == rows || coord.col + 1 == cols
}

fn surrounding(coord: Coord, rows: usize, cols: usize) -> Vec<Coord> {
    let mut result = Vec::with_capacity(8);
    let row_min = coord.row.saturating_sub(1);
    let row_max = (coord.row + 1).min(rows - 1);
    let col_min = coord.col.saturating_sub(1);
    let col_max = (coord.col + 1).min(cols - 1);
    for row in row_min..=row_max {
        for col in col_min..=col_max {
            if row == coord.row && col == coord.col {
                continue;
            }
            result.push(Coord::new(row, col));
        }
    }
    result
}
