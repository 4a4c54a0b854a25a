//! Pickups scattered on the board at level start.
//!
//! A powerup is consumed the moment a unit lands on its cell. Board effects
//! are applied here directly; effects on turn order (extra turn, shield,
//! skip) are returned as a [`Grant`] for the turn engine to record.

use crate::board::{Board, CellType, Owner, Side};
use crate::hex::HexCoord;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cells reverted by a single `Emp` pickup, at most
const EMP_REVERTS: usize = 2;

/// Whether a powerup helps or hurts whoever picks it up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
}

/// Powerup catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Powerup {
    /// Claim every adjacent neutral, non-rock cell
    Surge,
    /// Move again immediately
    Overclock,
    /// One shield charge
    Aegis,
    /// The opponent's next turn is skipped
    Stasis,
    /// Up to two of the picker's own cells revert to neutral
    Emp,
    /// One adjacent own cell defects to the opponent
    Corrupt,
}

/// Spawn table. `Corrupt` appears twice and so spawns twice as often.
pub const SPAWN_TABLE: [Powerup; 7] = [
    Powerup::Surge,
    Powerup::Overclock,
    Powerup::Aegis,
    Powerup::Stasis,
    Powerup::Emp,
    Powerup::Corrupt,
    Powerup::Corrupt,
];

impl Powerup {
    /// Stable identifier used by content tables and clients
    pub fn id(&self) -> &'static str {
        match self {
            Powerup::Surge => "surge",
            Powerup::Overclock => "overclock",
            Powerup::Aegis => "aegis",
            Powerup::Stasis => "stasis",
            Powerup::Emp => "emp",
            Powerup::Corrupt => "corrupt",
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            Powerup::Surge | Powerup::Overclock | Powerup::Aegis => Polarity::Positive,
            Powerup::Stasis | Powerup::Emp | Powerup::Corrupt => Polarity::Negative,
        }
    }
}

/// A turn-order effect the engine must record for the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grant {
    ExtraTurn,
    Shield,
    SkipOpponent,
}

/// What a pickup did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerupOutcome {
    pub powerup: Powerup,
    /// Cells whose owner changed
    pub changed: Vec<HexCoord>,
    pub grant: Option<Grant>,
}

/// Number of powerups placed on a board of radius `size`
pub fn spawn_count(size: i32) -> usize {
    size.clamp(3, 4) as usize
}

/// Place powerups on distinct empty, neutral cells.
///
/// Cells are drawn uniformly without replacement and each gets a uniformly
/// random entry of [`SPAWN_TABLE`]. Fewer are placed if the board has fewer
/// eligible cells.
pub fn spawn<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> Vec<(HexCoord, Powerup)> {
    let eligible: Vec<HexCoord> = board
        .cells()
        .filter(|c| c.cell_type == CellType::Empty && c.owner == Owner::Neutral)
        .filter(|c| c.powerup.is_none())
        .map(|c| c.coord)
        .collect();

    let count = spawn_count(board.size()).min(eligible.len());
    let mut placed = Vec::with_capacity(count);
    for coord in eligible.choose_multiple(rng, count) {
        let powerup = *SPAWN_TABLE.choose(rng).unwrap_or(&Powerup::Surge);
        if let Some(cell) = board.get_mut(coord) {
            cell.powerup = Some(powerup);
            placed.push((*coord, powerup));
        }
    }
    placed.sort_by_key(|(coord, _)| *coord);
    placed
}

/// Apply `powerup`, picked up by `picker` at `at`, to the post-claim board
pub fn apply<R: Rng + ?Sized>(
    board: &mut Board,
    powerup: Powerup,
    picker: Side,
    at: HexCoord,
    rng: &mut R,
) -> PowerupOutcome {
    let own = picker.owner();
    let mut changed = Vec::new();
    let mut grant = None;

    match powerup {
        Powerup::Surge => {
            for n in board.neighbors_on_board(&at) {
                if let Some(cell) = board.get_mut(&n) {
                    if cell.owner == Owner::Neutral && !cell.is_rock() {
                        cell.owner = own;
                        changed.push(n);
                    }
                }
            }
        }
        Powerup::Overclock => grant = Some(Grant::ExtraTurn),
        Powerup::Aegis => grant = Some(Grant::Shield),
        Powerup::Stasis => grant = Some(Grant::SkipOpponent),
        Powerup::Emp => {
            let owned = board.owned_open_cells(own);
            for coord in owned.choose_multiple(rng, EMP_REVERTS) {
                if let Some(cell) = board.get_mut(coord) {
                    cell.owner = Owner::Neutral;
                    changed.push(*coord);
                }
            }
        }
        Powerup::Corrupt => {
            let adjacent: Vec<HexCoord> = board
                .neighbors_on_board(&at)
                .into_iter()
                .filter(|n| {
                    board
                        .get(n)
                        .is_some_and(|c| c.owner == own && c.cell_type == CellType::Empty)
                })
                .collect();

            let (target, new_owner) = match adjacent.choose(rng) {
                Some(coord) => (Some(*coord), picker.opponent().owner()),
                None => (board.owned_open_cells(own).choose(rng).copied(), Owner::Neutral),
            };
            if let Some(coord) = target {
                if let Some(cell) = board.get_mut(&coord) {
                    cell.owner = new_owner;
                    changed.push(coord);
                }
            }
        }
    }

    changed.sort();
    PowerupOutcome {
        powerup,
        changed,
        grant,
    }
}
