//! Terminal-state detection.

use crate::board::{Board, Side};
use crate::hex::HexCoord;
use crate::level::LevelDefinition;
use serde::{Deserialize, Serialize};

/// How a level ended, from the player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    /// The outcome of `side` winning
    pub fn victory_for(side: Side) -> Self {
        match side {
            Side::Player => Outcome::Won,
            Side::Enemy => Outcome::Lost,
        }
    }
}

/// Why a level ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryReason {
    /// The mover stepped onto the opposing base
    BaseCaptured,
    /// The mover's share of the board reached the level threshold
    Coverage,
}

/// The opposing base as seen by `side`
pub fn opposing_base(level: &LevelDefinition, side: Side) -> HexCoord {
    match side {
        Side::Player => level.enemy_start,
        Side::Enemy => level.player_start,
    }
}

/// Check whether `mover`'s move onto `target` ended the level.
///
/// `board` must be the state after claim, powerup and enclosure capture.
/// Base capture is checked before coverage.
pub fn evaluate(
    board: &Board,
    mover: Side,
    target: HexCoord,
    level: &LevelDefinition,
) -> Option<(Outcome, VictoryReason)> {
    if target == opposing_base(level, mover) {
        return Some((Outcome::victory_for(mover), VictoryReason::BaseCaptured));
    }
    if board.counts().coverage(mover) >= level.win_threshold {
        return Some((Outcome::victory_for(mover), VictoryReason::Coverage));
    }
    None
}
