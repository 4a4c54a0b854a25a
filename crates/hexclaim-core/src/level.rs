//! Level definitions and the validated level catalog.
//!
//! Levels are static content. Every level in a [`LevelCatalog`] has been
//! validated, so the engine never has to deal with a malformed board.

use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest board radius accepted from configuration
pub const MAX_BOARD_SIZE: i32 = 32;

/// Agent strength ceiling
pub const MAX_AGENT_STRENGTH: u8 = 100;

/// Configuration errors, fatal at load time
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum LevelError {
    #[error("Board size {0} is out of range (1..={})", MAX_BOARD_SIZE)]
    InvalidSize(i32),

    #[error("Start position {0} lies outside the board")]
    StartOutOfRange(HexCoord),

    #[error("Player and enemy start on the same cell")]
    OverlappingStarts,

    #[error("Rock {0} lies outside the board")]
    RockOutOfRange(HexCoord),

    #[error("Rock {0} covers a start position")]
    RockOnBase(HexCoord),

    #[error("Win threshold {0} must be in (0, 1]")]
    InvalidWinThreshold(f64),

    #[error("Agent strength {0} exceeds {}", MAX_AGENT_STRENGTH)]
    InvalidAgentStrength(u8),

    #[error("Level catalog is empty")]
    EmptyCatalog,

    #[error("Level table could not be parsed: {0}")]
    Parse(String),
}

/// The numeric description of one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Hexagon radius
    pub size: i32,
    pub player_start: HexCoord,
    pub enemy_start: HexCoord,
    #[serde(default)]
    pub rocks: Vec<HexCoord>,
    /// Fraction of all cells a side must own to win outright
    pub win_threshold: f64,
    /// Tuning for the enemy heuristic, 0..=100
    pub agent_strength: u8,
}

impl LevelDefinition {
    /// Check the level for configuration errors
    pub fn validate(&self) -> Result<(), LevelError> {
        if !(1..=MAX_BOARD_SIZE).contains(&self.size) {
            return Err(LevelError::InvalidSize(self.size));
        }
        for start in [self.player_start, self.enemy_start] {
            if !start.within(self.size) {
                return Err(LevelError::StartOutOfRange(start));
            }
        }
        if self.player_start == self.enemy_start {
            return Err(LevelError::OverlappingStarts);
        }
        for rock in &self.rocks {
            if !rock.within(self.size) {
                return Err(LevelError::RockOutOfRange(*rock));
            }
            if *rock == self.player_start || *rock == self.enemy_start {
                return Err(LevelError::RockOnBase(*rock));
            }
        }
        if !(self.win_threshold > 0.0 && self.win_threshold <= 1.0) {
            return Err(LevelError::InvalidWinThreshold(self.win_threshold));
        }
        if self.agent_strength > MAX_AGENT_STRENGTH {
            return Err(LevelError::InvalidAgentStrength(self.agent_strength));
        }
        Ok(())
    }

    /// Maximum hex distance between two cells of this level's board
    pub fn max_distance(&self) -> u32 {
        2 * self.size as u32
    }
}

/// An ordered, non-empty, fully validated table of levels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelCatalog {
    levels: Vec<LevelDefinition>,
}

impl LevelCatalog {
    /// Validate every level and build the catalog
    pub fn new(levels: Vec<LevelDefinition>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::EmptyCatalog);
        }
        for level in &levels {
            level.validate()?;
        }
        Ok(Self { levels })
    }

    /// Parse a JSON array of level definitions
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let levels: Vec<LevelDefinition> =
            serde_json::from_str(json).map_err(|e| LevelError::Parse(e.to_string()))?;
        Self::new(levels)
    }

    /// The three stock levels
    pub fn builtin() -> Self {
        Self {
            levels: vec![
                LevelDefinition {
                    size: 4,
                    player_start: HexCoord::new(-3, 0),
                    enemy_start: HexCoord::new(3, 0),
                    rocks: vec![HexCoord::new(0, 0), HexCoord::new(0, 1), HexCoord::new(0, -1)],
                    win_threshold: 0.6,
                    agent_strength: 10,
                },
                LevelDefinition {
                    size: 5,
                    player_start: HexCoord::new(-4, 2),
                    enemy_start: HexCoord::new(4, -2),
                    rocks: vec![HexCoord::new(-1, 0), HexCoord::new(1, 0), HexCoord::new(0, 0)],
                    win_threshold: 0.6,
                    agent_strength: 55,
                },
                LevelDefinition {
                    size: 6,
                    player_start: HexCoord::new(-5, 0),
                    enemy_start: HexCoord::new(5, 0),
                    rocks: vec![HexCoord::new(-2, 1), HexCoord::new(2, -1)],
                    win_threshold: 0.55,
                    agent_strength: 85,
                },
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Wrap an arbitrary index into the catalog
    pub fn wrap_index(&self, index: usize) -> usize {
        index % self.levels.len()
    }

    /// Level at `index`, wrapping past the end
    pub fn get(&self, index: usize) -> &LevelDefinition {
        &self.levels[self.wrap_index(index)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelDefinition> {
        self.levels.iter()
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
