//! Best score per game
//!
//! Persisted as one JSON object `{ gameId: best }` under a single key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;

/// Best scores keyed by game id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScores {
    pub best: BTreeMap<String, u64>,
}

impl HighScores {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "neon_arcade_scores";

    /// Create empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Best score for a game, zero if never played
    pub fn best(&self, game_id: &str) -> u64 {
        self.best.get(game_id).copied().unwrap_or(0)
    }

    /// Offer a final score. Returns true if it beats the stored best, in which
    /// case it becomes the new best.
    pub fn submit(&mut self, game_id: &str, score: u64) -> bool {
        if score > self.best(game_id) {
            self.best.insert(game_id.to_string(), score);
            true
        } else {
            false
        }
    }

    /// Load from storage. Unavailable or corrupt storage reads as empty.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get_json::<HighScores>(Self::STORAGE_KEY) {
            Ok(Some(scores)) => {
                log::info!("Loaded best scores for {} games", scores.best.len());
                scores
            }
            Ok(None) => Self::new(),
            Err(e) => {
                log::warn!("Best scores unreadable, starting fresh: {e}");
                Self::new()
            }
        }
    }

    /// Save to storage. A failed write is logged and dropped.
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        if let Err(e) = store.set_json(Self::STORAGE_KEY, self) {
            log::warn!("Best scores not saved: {e}");
        }
    }

    /// Read-compare-write for a finished run. Returns whether it was a new best.
    pub fn record(store: &mut dyn KeyValueStore, game_id: &str, score: u64) -> bool {
        let mut scores = Self::load(store);
        let is_high = scores.submit(game_id, score);
        if is_high {
            scores.save(store);
        }
        is_high
    }
}
