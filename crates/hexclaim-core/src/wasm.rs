//! WebAssembly bindings for the Hexclaim engine.
//!
//! Everything crosses the boundary as JSON strings. The browser is
//! responsible for pacing enemy moves: after a player move it waits, then
//! calls `runEnemyTurns` with the epoch it saw.

use wasm_bindgen::prelude::*;

use crate::game::{EngineConfig, GameEngine, TurnPhase};
use crate::hex::HexCoord;
use crate::level::LevelCatalog;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed engine wrapper
#[wasm_bindgen]
pub struct WasmGame {
    engine: GameEngine,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game over the built-in levels, optionally seeded
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u64>) -> Result<WasmGame, JsValue> {
        let config = EngineConfig {
            seed,
            ..Default::default()
        };
        let engine = GameEngine::new(LevelCatalog::builtin(), config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmGame { engine })
    }

    /// Create a game from a JSON array of level definitions
    #[wasm_bindgen(js_name = withLevels)]
    pub fn with_levels(levels_json: &str, seed: Option<u64>) -> Result<WasmGame, JsValue> {
        let catalog =
            LevelCatalog::from_json(levels_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let config = EngineConfig {
            seed,
            ..Default::default()
        };
        let engine =
            GameEngine::new(catalog, config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmGame { engine })
    }

    /// Get the full snapshot as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.engine.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    #[wasm_bindgen(js_name = getEpoch)]
    pub fn get_epoch(&self) -> u64 {
        self.engine.epoch()
    }

    /// Get the current phase as a string
    #[wasm_bindgen(js_name = getPhase)]
    pub fn get_phase(&self) -> String {
        serde_json::to_string(&self.engine.phase()).unwrap_or_else(|_| "\"Unknown\"".to_string())
    }

    #[wasm_bindgen(js_name = isEnemyTurn)]
    pub fn is_enemy_turn(&self) -> bool {
        self.engine.phase() == TurnPhase::EnemyTurn
    }

    /// Start level `index` (wrapping), returns events JSON
    #[wasm_bindgen(js_name = initLevel)]
    pub fn init_level(&mut self, index: usize) -> Result<String, JsValue> {
        match self.engine.init_level(index) {
            Ok(events) => Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())),
            Err(e) => Err(JsValue::from_str(&format!("Level failed: {}", e))),
        }
    }

    /// Move the player, returns events JSON or the rejection reason
    #[wasm_bindgen(js_name = movePlayer)]
    pub fn move_player(&mut self, q: i32, r: i32) -> Result<String, JsValue> {
        match self.engine.move_player(HexCoord::new(q, r)) {
            Ok(events) => Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())),
            Err(e) => Err(JsValue::from_str(&format!("Move rejected: {}", e))),
        }
    }

    /// Play a single enemy turn, returns events JSON or the rejection reason
    #[wasm_bindgen(js_name = moveEnemy)]
    pub fn move_enemy(&mut self) -> Result<String, JsValue> {
        match self.engine.move_enemy() {
            Ok(events) => Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())),
            Err(e) => Err(JsValue::from_str(&format!("Move rejected: {}", e))),
        }
    }

    /// Play the pending enemy turns if `epoch` is still current
    #[wasm_bindgen(js_name = runEnemyTurns)]
    pub fn run_enemy_turns(&mut self, epoch: u64) -> String {
        let events = self.engine.run_enemy_turns_for(epoch);
        serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = levelCount)]
    pub fn level_count(&self) -> usize {
        self.engine.catalog().len()
    }
}
