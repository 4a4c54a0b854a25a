//! Move selection for the enemy side.
//!
//! Two regimes, chosen by the level's agent strength:
//! - Naive (strength <= 15): take the player base if adjacent, else the
//!   first neutral neighbor, else close in on the player base
//! - Scored (strength > 15): weigh every neighbor with a set of terms that
//!   switch on one by one as strength rises, and take the best
//!
//! The agent only picks a target. Whether the move is legal under the
//! combat rule is decided afterwards by the turn engine.

use crate::board::{Board, Owner};
use crate::capture::capture_enclosed;
use crate::hex::HexCoord;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Highest strength that still uses the naive regime
pub const NAIVE_MAX_STRENGTH: u8 = 15;

/// Upper bound of the tie-break jitter
const JITTER: f64 = 0.25;

/// What the agent knows about the position
#[derive(Debug, Clone, Copy)]
pub struct AgentView<'a> {
    pub board: &'a Board,
    pub enemy_pos: HexCoord,
    pub player_pos: HexCoord,
    pub player_base: HexCoord,
}

impl AgentView<'_> {
    /// Neighbors of the enemy that can be stepped on
    pub fn candidates(&self) -> Vec<HexCoord> {
        self.board.walkable_neighbors(&self.enemy_pos)
    }
}

/// Heuristic opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyAgent {
    pub strength: u8,
}

impl EnemyAgent {
    pub fn new(strength: u8) -> Self {
        Self { strength }
    }

    pub fn is_naive(&self) -> bool {
        self.strength <= NAIVE_MAX_STRENGTH
    }

    /// Pick the enemy's next target, or `None` if it cannot move at all
    pub fn choose_target<R: Rng + ?Sized>(
        &self,
        view: &AgentView<'_>,
        rng: &mut R,
    ) -> Option<HexCoord> {
        let candidates = view.candidates();
        if candidates.is_empty() {
            return None;
        }

        if self.is_naive() {
            return Some(self.choose_naive(view, &candidates));
        }

        let mut best: Option<(HexCoord, f64)> = None;
        for candidate in candidates {
            let score = self.score(view, candidate) + rng.gen_range(0.0..JITTER);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((candidate, score));
            }
        }
        best.map(|(coord, _)| coord)
    }

    fn choose_naive(&self, view: &AgentView<'_>, candidates: &[HexCoord]) -> HexCoord {
        if let Some(base) = candidates.iter().find(|c| **c == view.player_base) {
            return *base;
        }
        if let Some(neutral) = candidates
            .iter()
            .find(|c| view.board.owner_at(c) == Some(Owner::Neutral))
        {
            return *neutral;
        }
        // First of the closest, in scan order
        let mut closest = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.distance_to(&view.player_base) < closest.distance_to(&view.player_base) {
                closest = *candidate;
            }
        }
        closest
    }

    /// Deterministic part of a candidate's score
    pub fn score(&self, view: &AgentView<'_>, candidate: HexCoord) -> f64 {
        let strength = self.strength;
        let board = view.board;
        let owner = board.owner_at(&candidate).unwrap_or(Owner::Neutral);
        let counts = board.counts();
        let mut score = 0.0;

        if candidate == view.player_base {
            score += 100.0;
        }
        if owner == Owner::Neutral && strength >= 20 {
            score += 6.0;
        }
        if owner == Owner::Player {
            if strength >= 25 {
                score += 4.0;
            }
            if strength >= 40 && counts.enemy <= counts.player {
                score -= 40.0;
            }
        }
        if strength >= 50 {
            let max_dist = 2.0 * board.size() as f64;
            let dist = candidate.distance_to(&view.player_base) as f64;
            score += (max_dist - dist) * 0.6;
        }
        if strength >= 60 {
            score += simulated_gain(board, candidate) as f64 * 0.8;
        }
        if strength >= 80 && view.player_pos.is_adjacent(&candidate) && owner != Owner::Enemy {
            score += 4.0;
        }
        score
    }
}

/// Enemy cells gained by claiming `candidate` and capturing, on a scratch copy
fn simulated_gain(board: &Board, candidate: HexCoord) -> i64 {
    let before = board.counts().enemy as i64;
    let mut scratch = board.clone();
    if scratch.claim(candidate, Owner::Enemy).is_none() {
        return 0;
    }
    capture_enclosed(&mut scratch, Owner::Enemy);
    scratch.counts().enemy as i64 - before
}
