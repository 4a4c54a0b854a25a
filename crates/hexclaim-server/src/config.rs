//! Server configuration from the environment.

use anyhow::Context;
use hexclaim_core::{EngineConfig, LevelCatalog};
use std::net::SocketAddr;
use std::time::Duration;

/// Default pause between a player move and the enemy's reply
pub const DEFAULT_ENEMY_DELAY_MS: u64 = 600;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Pacing delay before a scheduled enemy turn runs
    pub enemy_delay: Duration,
    pub catalog: LevelCatalog,
    /// Base seed; session `n` is seeded with `seed + n`
    pub seed: Option<u64>,
    pub powerups: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            enemy_delay: Duration::from_millis(DEFAULT_ENEMY_DELAY_MS),
            catalog: LevelCatalog::builtin(),
            seed: None,
            powerups: true,
        }
    }
}

impl ServerConfig {
    /// Read `SERVER_ADDR`, `HEXCLAIM_ENEMY_DELAY_MS`, `HEXCLAIM_LEVELS`,
    /// `HEXCLAIM_SEED` and `HEXCLAIM_POWERUPS`
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = get("SERVER_ADDR") {
            config.addr = addr
                .parse()
                .with_context(|| format!("Invalid SERVER_ADDR: {}", addr))?;
        }
        if let Some(delay) = get("HEXCLAIM_ENEMY_DELAY_MS") {
            let ms: u64 = delay
                .parse()
                .with_context(|| format!("Invalid HEXCLAIM_ENEMY_DELAY_MS: {}", delay))?;
            config.enemy_delay = Duration::from_millis(ms);
        }
        if let Some(path) = get("HEXCLAIM_LEVELS") {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read level table {}", path))?;
            config.catalog = LevelCatalog::from_json(&json)
                .with_context(|| format!("Invalid level table {}", path))?;
        }
        if let Some(seed) = get("HEXCLAIM_SEED") {
            config.seed = Some(
                seed.parse()
                    .with_context(|| format!("Invalid HEXCLAIM_SEED: {}", seed))?,
            );
        }
        if let Some(flag) = get("HEXCLAIM_POWERUPS") {
            config.powerups = !matches!(flag.trim().to_ascii_lowercase().as_str(), "0" | "false");
        }

        Ok(config)
    }

    /// Engine settings for the `n`th session
    pub fn engine_config(&self, n: u64) -> EngineConfig {
        EngineConfig {
            seed: self.seed.map(|seed| seed.wrapping_add(n)),
            powerups: self.powerups,
            ..Default::default()
        }
    }
}
