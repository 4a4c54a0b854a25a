//! Hexclaim - a turn-based hex territory capture engine
//!
//! Two units, the player and a heuristic enemy, walk a hexagonal board. Every
//! step claims a cell; fully enclosed regions flip to whoever closed the
//! loop. A level ends when a unit steps onto the opposing base or one side
//! covers enough of the board.
//!
//! # Architecture
//!
//! The engine is platform-agnostic and fully synchronous. It can be hosted:
//! - Natively, behind the WebSocket server in `hexclaim-server`
//! - As WebAssembly, through the `wasm` feature
//!
//! Pacing of enemy moves is left to the host; the engine only offers
//! [`GameEngine::run_enemy_turns_for`] so a delayed callback from an old
//! level becomes a no-op.
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates and the hexagon shape
//! - [`level`]: Level definitions and the level catalog
//! - [`board`]: Cell storage, ownership and counts
//! - [`capture`]: Enclosure capture by flood fill
//! - [`powerup`]: Pickups, spawning and their effects
//! - [`outcome`]: Win and loss detection
//! - [`agent`]: Enemy move selection
//! - [`actions`]: Events and move rejections
//! - [`game`]: The turn engine

pub mod actions;
pub mod agent;
pub mod board;
pub mod capture;
pub mod game;
pub mod hex;
pub mod level;
pub mod outcome;
pub mod powerup;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{EventId, EventKind, GameEvent, MoveRejection};
pub use agent::{AgentView, EnemyAgent};
pub use board::{Board, Cell, CellType, Owner, OwnershipCounts, Side};
pub use capture::{capture_enclosed, enclosed_cells};
pub use game::{EngineConfig, GameEngine, GameSnapshot, TurnPhase, TurnState};
pub use hex::{Direction, HexCoord};
pub use level::{LevelCatalog, LevelDefinition, LevelError};
pub use outcome::{Outcome, VictoryReason};
pub use powerup::{Grant, Polarity, Powerup};
