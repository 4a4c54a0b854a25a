//! Board representation: cells, ownership and the initial grid builder.
//!
//! A board covers exactly the hexagon of radius `size` around the origin.
//! Cells are created once by [`Board::build`] and never added or removed
//! afterwards; moves only change a cell's owner or its powerup slot.

use crate::hex::{hexagon_cell_count, HexCoord};
use crate::level::{LevelDefinition, LevelError};
use crate::powerup::Powerup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What occupies a cell, independent of who owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CellType {
    #[default]
    Empty,
    /// A starting cell; keeps this type even after its owner flips
    Base,
    /// Impassable terrain
    Rock,
}

/// Who a cell belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Owner {
    #[default]
    Neutral,
    Player,
    Enemy,
}

/// One of the two moving sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }

    pub fn owner(self) -> Owner {
        match self {
            Side::Player => Owner::Player,
            Side::Enemy => Owner::Enemy,
        }
    }
}

impl From<Side> for Owner {
    fn from(side: Side) -> Self {
        side.owner()
    }
}

/// A single hex cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub coord: HexCoord,
    pub cell_type: CellType,
    pub owner: Owner,
    /// Pickup waiting on this cell, if any
    pub powerup: Option<Powerup>,
}

impl Cell {
    /// An empty, unowned cell
    pub fn empty(coord: HexCoord) -> Self {
        Self {
            coord,
            cell_type: CellType::Empty,
            owner: Owner::Neutral,
            powerup: None,
        }
    }

    pub fn is_rock(&self) -> bool {
        self.cell_type == CellType::Rock
    }

    pub fn is_base(&self) -> bool {
        self.cell_type == CellType::Base
    }
}

/// Cell counts per owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OwnershipCounts {
    pub player: usize,
    pub enemy: usize,
    pub neutral: usize,
    pub total: usize,
}

impl OwnershipCounts {
    /// Cells owned by `side`
    pub fn of(&self, side: Side) -> usize {
        match side {
            Side::Player => self.player,
            Side::Enemy => self.enemy,
        }
    }

    /// Fraction of the whole board owned by `side`
    pub fn coverage(&self, side: Side) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.of(side) as f64 / self.total as f64
    }
}

/// The hexagonal game board
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    size: i32,
    cells: BTreeMap<HexCoord, Cell>,
}

impl Board {
    /// A hexagon of radius `size` with every cell empty and neutral
    pub fn hexagon(size: i32) -> Self {
        let cells = HexCoord::hexagon(size)
            .into_iter()
            .map(|coord| (coord, Cell::empty(coord)))
            .collect();
        Self { size, cells }
    }

    /// Build the initial board for a level.
    ///
    /// Bases are stamped first, then rocks. Fails with the level's
    /// configuration error if the definition is malformed.
    pub fn build(level: &LevelDefinition) -> Result<Self, LevelError> {
        level.validate()?;

        let mut board = Self::hexagon(level.size);
        for (coord, owner) in [
            (level.player_start, Owner::Player),
            (level.enemy_start, Owner::Enemy),
        ] {
            if let Some(cell) = board.cells.get_mut(&coord) {
                cell.cell_type = CellType::Base;
                cell.owner = owner;
            }
        }
        for rock in &level.rocks {
            if let Some(cell) = board.cells.get_mut(rock) {
                cell.cell_type = CellType::Rock;
            }
        }

        debug_assert_eq!(board.len(), hexagon_cell_count(level.size));
        Ok(board)
    }

    /// Hexagon radius
    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: &HexCoord) -> bool {
        self.cells.contains_key(coord)
    }

    pub fn get(&self, coord: &HexCoord) -> Option<&Cell> {
        self.cells.get(coord)
    }

    pub fn get_mut(&mut self, coord: &HexCoord) -> Option<&mut Cell> {
        self.cells.get_mut(coord)
    }

    /// Owner of the cell at `coord`, if it exists
    pub fn owner_at(&self, coord: &HexCoord) -> Option<Owner> {
        self.cells.get(coord).map(|c| c.owner)
    }

    /// All cells in (q, r) order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.values_mut()
    }

    /// Whether `coord` is on the outer ring of this board
    pub fn is_boundary(&self, coord: &HexCoord) -> bool {
        coord.on_boundary(self.size)
    }

    /// Neighbors of `coord` that exist on this board
    pub fn neighbors_on_board(&self, coord: &HexCoord) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|n| self.contains(n))
            .collect()
    }

    /// Neighbors of `coord` a unit may step onto (on board, not rock)
    pub fn walkable_neighbors(&self, coord: &HexCoord) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|n| self.get(n).is_some_and(|c| !c.is_rock()))
            .collect()
    }

    /// Count cells per owner
    pub fn counts(&self) -> OwnershipCounts {
        let mut counts = OwnershipCounts {
            total: self.cells.len(),
            ..Default::default()
        };
        for cell in self.cells.values() {
            match cell.owner {
                Owner::Player => counts.player += 1,
                Owner::Enemy => counts.enemy += 1,
                Owner::Neutral => counts.neutral += 1,
            }
        }
        counts
    }

    /// Give the cell at `coord` to `owner` and take any powerup lying on it.
    ///
    /// Returns `None` if the cell does not exist, otherwise the powerup that
    /// was picked up (if there was one).
    pub fn claim(&mut self, coord: HexCoord, owner: Owner) -> Option<Option<Powerup>> {
        let cell = self.cells.get_mut(&coord)?;
        cell.owner = owner;
        Some(cell.powerup.take())
    }

    /// Coordinates of non-base, non-rock cells owned by `owner`
    pub fn owned_open_cells(&self, owner: Owner) -> Vec<HexCoord> {
        self.cells
            .values()
            .filter(|c| c.owner == owner && c.cell_type == CellType::Empty)
            .map(|c| c.coord)
            .collect()
    }

    /// Cells currently carrying a powerup
    pub fn powerups(&self) -> Vec<(HexCoord, Powerup)> {
        self.cells
            .values()
            .filter_map(|c| c.powerup.map(|p| (c.coord, p)))
            .collect()
    }
}
