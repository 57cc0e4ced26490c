//! Per-round mutable context threaded through every step.

use serde::{Deserialize, Serialize};

pub const STARTING_LIVES: u32 = 3;

/// Score, lives and level of the round in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundContext {
    pub level: u32,
    pub lives: u32,
    pub score: i64,
}

impl RoundContext {
    pub fn new(level: u32) -> Self {
        Self {
            level,
            lives: STARTING_LIVES,
            score: 0,
        }
    }

    pub fn add_score(&mut self, points: i64) {
        self.score += points;
    }

    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }
}

impl Default for RoundContext {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundStatus {
    Continue,
    AvatarDied,
    RoundWon,
}

impl RoundStatus {
    pub fn is_over(self) -> bool {
        self != Self::Continue
    }
}
