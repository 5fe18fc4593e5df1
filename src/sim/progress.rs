//! Score, lives and level bookkeeping for one run

use serde::{Deserialize, Serialize};

/// Score/progress of the current run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub score: u64,
    pub lives: u8,
    /// 1-based level/wave number
    pub level: u32,
    /// Set once the run has ended; guards against a second finalization
    ended: bool,
}

impl Progress {
    pub fn new(lives: u8) -> Self {
        Self {
            score: 0,
            lives,
            level: 1,
            ended: false,
        }
    }

    pub fn award(&mut self, points: u32) {
        self.score += u64::from(points);
    }

    /// Take one life away. Returns true when no lives are left.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.lives == 0
    }

    pub fn next_level(&mut self) {
        self.level += 1;
    }

    /// Mark the run as ended. Only the first call returns true.
    pub fn end(&mut self) -> bool {
        !std::mem::replace(&mut self.ended, true)
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }
}
