//! WebSocket protocol messages for Hexclaim sessions.

use hexclaim_core::{GameEvent, GameSnapshot, LevelDefinition, MoveRejection, Outcome, VictoryReason};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Discard the current level and start another
    StartLevel { level_index: usize },

    /// Move the player's unit
    MovePlayer { q: i32, r: i32 },

    /// Request a fresh snapshot
    GetState,

    /// Request the level table
    ListLevels,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with assigned session ID
    Welcome { session_id: Uuid },

    /// A level was (re)started
    LevelStarted { state: GameSnapshot },

    /// Game state updated
    GameState { state: GameSnapshot },

    /// Events produced by a command or a paced enemy turn
    Events { events: Vec<GameEvent> },

    /// The player's move was refused; nothing changed
    MoveRejected {
        reason: MoveRejection,
        message: String,
    },

    /// Available levels
    LevelList { levels: Vec<LevelInfo> },

    /// Level finished
    GameOver {
        outcome: Outcome,
        reason: VictoryReason,
    },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

/// Level summary for clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub index: usize,
    pub size: i32,
    pub win_threshold: f64,
    pub agent_strength: u8,
}

impl LevelInfo {
    pub fn new(index: usize, level: &LevelDefinition) -> Self {
        Self {
            index,
            size: level.size,
            win_threshold: level.win_threshold,
            agent_strength: level.agent_strength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_format() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"MovePlayer","payload":{"q":-2,"r":0}}"#).unwrap();
        assert!(matches!(msg, ClientMessage::MovePlayer { q: -2, r: 0 }));

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"GetState"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::GetState));
    }

    #[test]
    fn test_rejection_message_format() {
        let msg = ServerMessage::MoveRejected {
            reason: MoveRejection::NotAdjacent,
            message: MoveRejection::NotAdjacent.to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "MoveRejected");
        assert_eq!(json["payload"]["reason"], "NotAdjacent");
    }
}
