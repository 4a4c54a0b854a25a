//! Core turn engine.
//!
//! `GameEngine` owns the board and turn state for one level at a time. It is
//! the only thing the outside world talks to: `init_level` rebuilds
//! everything, `move_player` plays the human side, and `move_enemy` (or
//! `run_enemy_turns`) plays the heuristic side.
//!
//! All commands are synchronous. Refused commands return a
//! [`MoveRejection`] and leave every piece of state untouched.

use crate::actions::{EventId, EventKind, GameEvent, MoveRejection};
use crate::agent::{AgentView, EnemyAgent};
use crate::board::{Board, Cell, OwnershipCounts, Side};
use crate::capture::capture_enclosed;
use crate::hex::HexCoord;
use crate::level::{LevelCatalog, LevelDefinition, LevelError};
use crate::outcome::{evaluate, opposing_base, Outcome};
use crate::powerup::{self, Grant};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default cap on consecutive repeat turns for one side
pub const DEFAULT_MAX_CHAINED_TURNS: u32 = 3;

/// Whose move it is, or how the level ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    PlayerTurn,
    EnemyTurn,
    Won,
    Lost,
}

impl TurnPhase {
    fn turn_of(side: Side) -> Self {
        match side {
            Side::Player => TurnPhase::PlayerTurn,
            Side::Enemy => TurnPhase::EnemyTurn,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnPhase::Won | TurnPhase::Lost)
    }
}

/// Phase plus the per-side counters and flags altering turn order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub phase: TurnPhase,
    pub player_shield: u32,
    pub enemy_shield: u32,
    /// The player's next turn is skipped
    pub skip_player_next: bool,
    /// The enemy's next turn is skipped
    pub skip_enemy_next: bool,
    pub player_extra_turn: bool,
    pub enemy_extra_turn: bool,
    /// Repeat turns the current side has taken in a row
    pub chained_turns: u32,
}

impl TurnState {
    fn new() -> Self {
        Self {
            phase: TurnPhase::PlayerTurn,
            player_shield: 0,
            enemy_shield: 0,
            skip_player_next: false,
            skip_enemy_next: false,
            player_extra_turn: false,
            enemy_extra_turn: false,
            chained_turns: 0,
        }
    }

    pub fn shield(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_shield,
            Side::Enemy => self.enemy_shield,
        }
    }

    fn shield_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Player => &mut self.player_shield,
            Side::Enemy => &mut self.enemy_shield,
        }
    }

    fn skip_mut(&mut self, side: Side) -> &mut bool {
        match side {
            Side::Player => &mut self.skip_player_next,
            Side::Enemy => &mut self.skip_enemy_next,
        }
    }

    fn extra_turn_mut(&mut self, side: Side) -> &mut bool {
        match side {
            Side::Player => &mut self.player_extra_turn,
            Side::Enemy => &mut self.enemy_extra_turn,
        }
    }

    /// Record a powerup grant for the side that picked it up
    fn record(&mut self, picker: Side, grant: Grant) {
        match grant {
            Grant::ExtraTurn => *self.extra_turn_mut(picker) = true,
            Grant::Shield => *self.shield_mut(picker) += 1,
            Grant::SkipOpponent => *self.skip_mut(picker.opponent()) = true,
        }
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seed for every random choice; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Whether powerups are spawned at level start
    pub powerups: bool,
    /// Consecutive repeat turns allowed before the turn passes regardless
    pub max_chained_turns: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            powerups: true,
            max_chained_turns: DEFAULT_MAX_CHAINED_TURNS,
        }
    }
}

/// Everything a presentation layer needs to draw the current state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub level_index: usize,
    pub epoch: u64,
    pub size: i32,
    pub win_threshold: f64,
    pub turn: TurnState,
    pub player_pos: HexCoord,
    pub prev_player_pos: HexCoord,
    pub enemy_pos: HexCoord,
    pub prev_enemy_pos: HexCoord,
    pub player_base: HexCoord,
    pub enemy_base: HexCoord,
    pub counts: OwnershipCounts,
    pub cells: Vec<Cell>,
}

/// The turn engine
#[derive(Debug, Clone)]
pub struct GameEngine {
    catalog: LevelCatalog,
    config: EngineConfig,
    level_index: usize,
    level: LevelDefinition,
    board: Board,
    turn: TurnState,
    player_pos: HexCoord,
    prev_player_pos: HexCoord,
    enemy_pos: HexCoord,
    prev_enemy_pos: HexCoord,
    /// Bumped by every `init_level`
    epoch: u64,
    next_event_id: EventId,
    rng: StdRng,
}

impl GameEngine {
    /// Create an engine and start the first level of `catalog`.
    ///
    /// The engine starts at epoch 1 without emitting a `LevelStarted`
    /// event; the first event id goes to the first command.
    pub fn new(catalog: LevelCatalog, config: EngineConfig) -> Result<Self, LevelError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (level_index, level, board) = Self::load_level(&catalog, &config, &mut rng, 0)?;
        info!(level = level_index, epoch = 1, size = level.size, "Level started");

        Ok(Self {
            catalog,
            config,
            level_index,
            player_pos: level.player_start,
            prev_player_pos: level.player_start,
            enemy_pos: level.enemy_start,
            prev_enemy_pos: level.enemy_start,
            level,
            board,
            turn: TurnState::new(),
            epoch: 1,
            next_event_id: 1,
            rng,
        })
    }

    /// Engine over the built-in levels with a fixed seed
    pub fn with_seed(seed: u64) -> Result<Self, LevelError> {
        let config = EngineConfig {
            seed: Some(seed),
            ..Default::default()
        };
        Self::new(LevelCatalog::builtin(), config)
    }

    // ==================== Queries ====================

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level(&self) -> &LevelDefinition {
        &self.level
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn phase(&self) -> TurnPhase {
        self.turn.phase
    }

    /// Generation counter of the current level
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn player_pos(&self) -> HexCoord {
        self.player_pos
    }

    pub fn prev_player_pos(&self) -> HexCoord {
        self.prev_player_pos
    }

    pub fn enemy_pos(&self) -> HexCoord {
        self.enemy_pos
    }

    pub fn prev_enemy_pos(&self) -> HexCoord {
        self.prev_enemy_pos
    }

    pub fn counts(&self) -> OwnershipCounts {
        self.board.counts()
    }

    pub fn is_finished(&self) -> bool {
        self.turn.phase.is_terminal()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.turn.phase {
            TurnPhase::Won => Some(Outcome::Won),
            TurnPhase::Lost => Some(Outcome::Lost),
            _ => None,
        }
    }

    /// Current position of `side`'s unit
    pub fn position(&self, side: Side) -> HexCoord {
        match side {
            Side::Player => self.player_pos,
            Side::Enemy => self.enemy_pos,
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            level_index: self.level_index,
            epoch: self.epoch,
            size: self.level.size,
            win_threshold: self.level.win_threshold,
            turn: self.turn.clone(),
            player_pos: self.player_pos,
            prev_player_pos: self.prev_player_pos,
            enemy_pos: self.enemy_pos,
            prev_enemy_pos: self.prev_enemy_pos,
            player_base: self.level.player_start,
            enemy_base: self.level.enemy_start,
            counts: self.board.counts(),
            cells: self.board.cells().cloned().collect(),
        }
    }

    // ==================== Commands ====================

    /// Discard the current level and start level `index` (wrapping).
    ///
    /// On a configuration error nothing is changed.
    pub fn init_level(&mut self, index: usize) -> Result<Vec<GameEvent>, LevelError> {
        let (level_index, level, board) =
            Self::load_level(&self.catalog, &self.config, &mut self.rng, index)?;

        self.level_index = level_index;
        self.player_pos = level.player_start;
        self.prev_player_pos = level.player_start;
        self.enemy_pos = level.enemy_start;
        self.prev_enemy_pos = level.enemy_start;
        self.level = level;
        self.board = board;
        self.turn = TurnState::new();
        self.epoch += 1;

        info!(
            level = level_index,
            epoch = self.epoch,
            size = self.level.size,
            "Level started"
        );

        Ok(vec![self.emit(EventKind::LevelStarted {
            level_index,
            epoch: self.epoch,
        })])
    }

    /// Move the player's unit onto an adjacent cell
    pub fn move_player(&mut self, target: HexCoord) -> Result<Vec<GameEvent>, MoveRejection> {
        if self.turn.phase != TurnPhase::PlayerTurn {
            return Err(MoveRejection::WrongTurn);
        }
        self.execute_move(Side::Player, target)
    }

    /// Play one enemy turn.
    ///
    /// A pending enemy skip is consumed first and hands the turn back.
    /// Otherwise the agent picks a target; if that target fails the combat
    /// rule the enemy forfeits the turn instead of trying another cell.
    pub fn move_enemy(&mut self) -> Result<Vec<GameEvent>, MoveRejection> {
        if self.turn.phase != TurnPhase::EnemyTurn {
            return Err(MoveRejection::WrongTurn);
        }
        if std::mem::take(&mut self.turn.skip_enemy_next) {
            self.pass_turn_to(Side::Player);
            return Ok(vec![self.emit(EventKind::TurnSkipped { side: Side::Enemy })]);
        }

        let agent = EnemyAgent::new(self.level.agent_strength);
        let view = AgentView {
            board: &self.board,
            enemy_pos: self.enemy_pos,
            player_pos: self.player_pos,
            player_base: self.level.player_start,
        };
        let Some(target) = agent.choose_target(&view, &mut self.rng) else {
            self.pass_turn_to(Side::Player);
            debug!("Enemy has no legal move");
            return Ok(vec![self.emit(EventKind::TurnPassed { side: Side::Enemy })]);
        };

        match self.execute_move(Side::Enemy, target) {
            Ok(events) => Ok(events),
            Err(MoveRejection::InsufficientAdvantage) => {
                self.pass_turn_to(Side::Player);
                debug!(%target, "Enemy attack vetoed, turn forfeited");
                Ok(vec![self.emit(EventKind::TurnForfeited {
                    side: Side::Enemy,
                    target,
                })])
            }
            Err(rejection) => {
                warn!(%target, %rejection, "Agent chose an illegal target");
                self.pass_turn_to(Side::Player);
                Ok(vec![self.emit(EventKind::TurnPassed { side: Side::Enemy })])
            }
        }
    }

    /// Play enemy turns until the phase leaves `EnemyTurn`.
    ///
    /// Extra turns and skips can hand the enemy several moves in a row; the
    /// chain is bounded by the configured cap.
    pub fn run_enemy_turns(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..=self.config.max_chained_turns {
            if self.turn.phase != TurnPhase::EnemyTurn {
                break;
            }
            match self.move_enemy() {
                Ok(batch) => events.extend(batch),
                Err(_) => break,
            }
        }
        if self.turn.phase == TurnPhase::EnemyTurn {
            warn!("Enemy turn chain did not settle, passing to player");
            self.pass_turn_to(Side::Player);
        }
        events
    }

    /// Deferred entry point for a paced enemy turn.
    ///
    /// Does nothing if `epoch` belongs to a level that has since been
    /// replaced, or if it is no longer the enemy's turn.
    pub fn run_enemy_turns_for(&mut self, epoch: u64) -> Vec<GameEvent> {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "Stale enemy turn ignored");
            return Vec::new();
        }
        self.run_enemy_turns()
    }

    // ==================== Internals ====================

    /// Build the board for level `index` (wrapping) and spawn its powerups
    fn load_level(
        catalog: &LevelCatalog,
        config: &EngineConfig,
        rng: &mut StdRng,
        index: usize,
    ) -> Result<(usize, LevelDefinition, Board), LevelError> {
        let level_index = catalog.wrap_index(index);
        let level = catalog.get(level_index).clone();
        let mut board = Board::build(&level)?;

        if config.powerups {
            let placed = powerup::spawn(&mut board, rng);
            debug!(count = placed.len(), "Spawned powerups");
        }
        Ok((level_index, level, board))
    }

    fn emit(&mut self, kind: EventKind) -> GameEvent {
        let id = self.next_event_id;
        self.next_event_id += 1;
        GameEvent { id, kind }
    }

    fn set_position(&mut self, side: Side, to: HexCoord) {
        match side {
            Side::Player => {
                self.prev_player_pos = self.player_pos;
                self.player_pos = to;
            }
            Side::Enemy => {
                self.prev_enemy_pos = self.enemy_pos;
                self.enemy_pos = to;
            }
        }
    }

    fn pass_turn_to(&mut self, side: Side) {
        self.turn.chained_turns = 0;
        self.turn.phase = TurnPhase::turn_of(side);
    }

    /// Validate and play a move for `side`. Rejections mutate nothing.
    fn execute_move(
        &mut self,
        side: Side,
        target: HexCoord,
    ) -> Result<Vec<GameEvent>, MoveRejection> {
        let from = self.position(side);
        if !from.is_adjacent(&target) {
            return Err(MoveRejection::NotAdjacent);
        }
        let cell = self.board.get(&target).ok_or(MoveRejection::CellBlocked)?;
        if cell.is_rock() {
            return Err(MoveRejection::CellBlocked);
        }

        let opponent = side.opponent();
        let contested = cell.owner == opponent.owner() && target != opposing_base(&self.level, side);
        let needs_shield = contested && {
            let counts = self.board.counts();
            counts.of(side) <= counts.of(opponent)
        };
        if needs_shield && self.turn.shield(side) == 0 {
            return Err(MoveRejection::InsufficientAdvantage);
        }

        let mut events = Vec::new();
        if needs_shield {
            let shield = self.turn.shield_mut(side);
            *shield -= 1;
            let remaining = *shield;
            events.push(self.emit(EventKind::ShieldSpent { side, remaining }));
        }

        // Claim
        let picked = self.board.claim(target, side.owner()).flatten();
        self.set_position(side, target);
        events.push(self.emit(EventKind::MoveAccepted {
            side,
            from,
            to: target,
        }));

        // Powerup on the post-claim board
        if let Some(powerup) = picked {
            let outcome = powerup::apply(&mut self.board, powerup, side, target, &mut self.rng);
            if let Some(grant) = outcome.grant {
                self.turn.record(side, grant);
            }
            debug!(?side, ?powerup, changed = outcome.changed.len(), "Powerup picked");
            events.push(self.emit(EventKind::PowerupPicked {
                powerup,
                side,
                coord: target,
            }));
        }

        // Enclosure
        let captured = capture_enclosed(&mut self.board, side.owner());
        if !captured.is_empty() {
            debug!(?side, count = captured.len(), "Territory captured");
            events.push(self.emit(EventKind::TerritoryCaptured {
                side,
                cells: captured,
            }));
        }

        if let Some((outcome, reason)) = evaluate(&self.board, side, target, &self.level) {
            let kind = match outcome {
                Outcome::Won => {
                    self.turn.phase = TurnPhase::Won;
                    EventKind::Won { reason }
                }
                Outcome::Lost => {
                    self.turn.phase = TurnPhase::Lost;
                    EventKind::Lost { reason }
                }
            };
            info!(?outcome, ?reason, level = self.level_index, "Level finished");
            events.push(self.emit(kind));
            return Ok(events);
        }

        self.end_turn(side, &mut events);
        Ok(events)
    }

    /// Decide who moves next after `side` completed a move.
    ///
    /// The mover's own extra turn is consumed first, then a pending skip of
    /// the opponent. Each consumed flag buys exactly one repeat turn.
    fn end_turn(&mut self, side: Side, events: &mut Vec<GameEvent>) {
        let opponent = side.opponent();

        if self.turn.chained_turns >= self.config.max_chained_turns {
            let extra = std::mem::take(self.turn.extra_turn_mut(side));
            let skip = std::mem::take(self.turn.skip_mut(opponent));
            if extra || skip {
                warn!(?side, "Turn chain cap reached, dropping pending repeats");
            }
            self.pass_turn_to(opponent);
            return;
        }

        let repeat = if std::mem::take(self.turn.extra_turn_mut(side)) {
            Some(EventKind::ExtraTurn { side })
        } else if std::mem::take(self.turn.skip_mut(opponent)) {
            Some(EventKind::TurnSkipped { side: opponent })
        } else {
            None
        };

        match repeat {
            Some(kind) => {
                self.turn.chained_turns += 1;
                self.turn.phase = TurnPhase::turn_of(side);
                events.push(self.emit(kind));
            }
            None => self.pass_turn_to(opponent),
        }
    }
}
