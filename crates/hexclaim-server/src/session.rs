//! Single-player game session management.

use hexclaim_core::{
    EngineConfig, EventKind, GameEngine, GameEvent, GameSnapshot, HexCoord, LevelCatalog,
    LevelError, MoveRejection, Outcome, TurnPhase, VictoryReason,
};
use thiserror::Error;

use crate::protocol::LevelInfo;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Level failed to load: {0}")]
    Level(#[from] LevelError),

    #[error("Move rejected: {0}")]
    Rejected(#[from] MoveRejection),
}

/// Result of an accepted player move
#[derive(Debug, Clone)]
pub struct MoveResult {
    pub events: Vec<GameEvent>,
    /// Epoch to schedule the enemy reply for, if it is the enemy's turn
    pub enemy_due: Option<u64>,
}

/// One connection's game.
pub struct GameSession {
    engine: GameEngine,
}

impl GameSession {
    pub fn new(catalog: LevelCatalog, config: EngineConfig) -> Result<Self, SessionError> {
        Ok(Self {
            engine: GameEngine::new(catalog, config)?,
        })
    }

    pub fn phase(&self) -> TurnPhase {
        self.engine.phase()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.engine.snapshot()
    }

    pub fn start_level(&mut self, level_index: usize) -> Result<Vec<GameEvent>, SessionError> {
        Ok(self.engine.init_level(level_index)?)
    }

    pub fn move_player(&mut self, q: i32, r: i32) -> Result<MoveResult, SessionError> {
        let events = self.engine.move_player(HexCoord::new(q, r))?;
        let enemy_due = (self.engine.phase() == TurnPhase::EnemyTurn).then(|| self.engine.epoch());
        Ok(MoveResult { events, enemy_due })
    }

    /// Run a paced enemy reply. Empty if the level moved on meanwhile.
    pub fn run_enemy_turns(&mut self, epoch: u64) -> Vec<GameEvent> {
        self.engine.run_enemy_turns_for(epoch)
    }

    pub fn levels(&self) -> Vec<LevelInfo> {
        self.engine
            .catalog()
            .iter()
            .enumerate()
            .map(|(index, level)| LevelInfo::new(index, level))
            .collect()
    }
}

/// The terminal event in `events`, if any
pub fn finish_reason(events: &[GameEvent]) -> Option<(Outcome, VictoryReason)> {
    events.iter().find_map(|event| match event.kind {
        EventKind::Won { reason } => Some((Outcome::Won, reason)),
        EventKind::Lost { reason } => Some((Outcome::Lost, reason)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        let config = EngineConfig {
            seed: Some(8),
            powerups: false,
            ..Default::default()
        };
        GameSession::new(LevelCatalog::builtin(), config).unwrap()
    }

    #[test]
    fn test_create_session() {
        let session = session();
        assert_eq!(session.phase(), TurnPhase::PlayerTurn);
        assert_eq!(session.snapshot().epoch, 1);
        assert_eq!(session.levels().len(), 3);
        assert_eq!(session.levels()[2].agent_strength, 85);
    }

    #[test]
    fn test_move_schedules_enemy() {
        let mut session = session();
        let result = session.move_player(-2, 0).unwrap();
        assert!(!result.events.is_empty());
        assert_eq!(result.enemy_due, Some(1));

        // Not the player's turn any more
        assert!(matches!(
            session.move_player(-1, 0),
            Err(SessionError::Rejected(MoveRejection::WrongTurn))
        ));

        let events = session.run_enemy_turns(1);
        assert!(!events.is_empty());
        assert_eq!(session.phase(), TurnPhase::PlayerTurn);
    }

    #[test]
    fn test_restart_invalidates_pending_enemy() {
        let mut session = session();
        let due = session.move_player(-2, 0).unwrap().enemy_due.unwrap();
        session.start_level(1).unwrap();

        assert!(session.run_enemy_turns(due).is_empty());
        assert_eq!(session.snapshot().level_index, 1);
    }

    #[test]
    fn test_finish_reason() {
        let events = vec![
            GameEvent {
                id: 1,
                kind: EventKind::TurnPassed {
                    side: hexclaim_core::Side::Enemy,
                },
            },
            GameEvent {
                id: 2,
                kind: EventKind::Lost {
                    reason: VictoryReason::Coverage,
                },
            },
        ];
        assert_eq!(
            finish_reason(&events),
            Some((Outcome::Lost, VictoryReason::Coverage))
        );
        assert_eq!(finish_reason(&events[..1]), None);
    }
}
