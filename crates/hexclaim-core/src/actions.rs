//! Notifications produced by the engine and the reasons a move is refused.

use crate::board::Side;
use crate::hex::HexCoord;
use crate::outcome::VictoryReason;
use crate::powerup::Powerup;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monotonically increasing identifier of a notification
pub type EventId = u64;

/// Why a move was refused. A refused move never changes any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MoveRejection {
    #[error("Not your turn")]
    WrongTurn,

    #[error("Target is not adjacent to the unit")]
    NotAdjacent,

    #[error("Target cell is blocked")]
    CellBlocked,

    /// A failed attack: the opponent holds at least as many cells and no
    /// shield was available
    #[error("Not enough territory to attack that cell")]
    InsufficientAdvantage,
}

/// Something that happened as a result of a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
    LevelStarted {
        level_index: usize,
        epoch: u64,
    },

    MoveAccepted {
        side: Side,
        from: HexCoord,
        to: HexCoord,
    },

    PowerupPicked {
        powerup: Powerup,
        side: Side,
        coord: HexCoord,
    },

    /// Enclosed cells changed hands after a move
    TerritoryCaptured {
        side: Side,
        cells: Vec<HexCoord>,
    },

    /// A shield charge turned a failed attack into a move
    ShieldSpent {
        side: Side,
        remaining: u32,
    },

    /// `side` moves again because of an extra-turn pickup
    ExtraTurn {
        side: Side,
    },

    /// `side` loses its turn because of a skip pickup
    TurnSkipped {
        side: Side,
    },

    /// `side` had no legal neighbor and passed
    TurnPassed {
        side: Side,
    },

    /// `side` chose an attack it could not win and lost its turn
    TurnForfeited {
        side: Side,
        target: HexCoord,
    },

    Won {
        reason: VictoryReason,
    },

    Lost {
        reason: VictoryReason,
    },
}

/// A notification, fired at most once per triggering event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: EventId,
    #[serde(flatten)]
    pub kind: EventKind,
}
