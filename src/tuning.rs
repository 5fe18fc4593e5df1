//! Data-driven gameplay balance
//!
//! Every knob has a default matching the stock games. A stored override only
//! needs the fields it changes; missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;

/// Breakout balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutTuning {
    pub lives: u8,
    /// Ball speed for the first level, units per step
    pub start_speed: f32,
    /// Free-flight steps between speed bumps
    pub ramp_interval: u32,
    pub ramp_step: f32,
    pub max_speed: f32,
    /// Base speed increase per cleared level
    pub level_speed_bonus: f32,
    pub max_level_speed: f32,
    pub paddle_key_speed: f32,
    /// Maximum paddle travel per step when following the pointer
    pub paddle_pointer_speed: f32,
    pub particles_per_brick: usize,
}

impl Default for BreakoutTuning {
    fn default() -> Self {
        Self {
            lives: 3,
            start_speed: 4.5,
            ramp_interval: 600,
            ramp_step: 0.3,
            max_speed: 12.0,
            level_speed_bonus: 1.0,
            max_level_speed: 11.0,
            paddle_key_speed: 6.0,
            paddle_pointer_speed: 9.0,
            particles_per_brick: 10,
        }
    }
}

/// Pong balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongTuning {
    /// Points needed to win; the player also has this many lives
    pub win_score: u8,
    pub start_speed: f32,
    /// Speed gained on every paddle hit
    pub speed_step: f32,
    pub max_speed: f32,
    pub ai_speed: f32,
    pub paddle_key_speed: f32,
    pub paddle_pointer_speed: f32,
}

impl Default for PongTuning {
    fn default() -> Self {
        Self {
            win_score: 7,
            start_speed: 4.0,
            speed_step: 0.3,
            max_speed: 14.0,
            ai_speed: 3.5,
            paddle_key_speed: 6.0,
            paddle_pointer_speed: 7.0,
        }
    }
}

/// Space Invaders balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvadersTuning {
    pub lives: u8,
    pub ship_speed: f32,
    pub shot_speed: f32,
    /// Minimum steps between two player shots
    pub shot_cooldown: u32,
    pub enemy_shot_speed: f32,
    /// Steps between enemy shots on the first wave
    pub fire_interval: u32,
    /// Fire interval shrinks by this much per wave, down to `min_fire_interval`
    pub fire_interval_step: u32,
    pub min_fire_interval: u32,
    /// Steps of immunity after losing a life
    pub invincible_ticks: u32,
}

impl Default for InvadersTuning {
    fn default() -> Self {
        Self {
            lives: 3,
            ship_speed: 5.0,
            shot_speed: 8.0,
            shot_cooldown: 20,
            enemy_shot_speed: 3.0,
            fire_interval: 120,
            fire_interval_step: 15,
            min_fire_interval: 40,
            invincible_ticks: 120,
        }
    }
}

/// Lights-Out scramble depth per difficulty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightsOutTuning {
    pub easy_moves: usize,
    pub medium_moves: usize,
    pub hard_moves: usize,
}

impl Default for LightsOutTuning {
    fn default() -> Self {
        Self {
            easy_moves: 6,
            medium_moves: 10,
            hard_moves: 15,
        }
    }
}

/// All game balance values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub breakout: BreakoutTuning,
    pub pong: PongTuning,
    pub invaders: InvadersTuning,
    pub lights_out: LightsOutTuning,
}

impl Tuning {
    pub const STORAGE_KEY: &'static str = "neon_arcade_tuning";

    /// Load overrides, falling back to defaults on any storage problem
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get_json::<Tuning>(Self::STORAGE_KEY) {
            Ok(Some(tuning)) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Tuning unreadable, using defaults: {e}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let mut store = MemoryStore::new();
        store.insert_raw(
            Tuning::STORAGE_KEY,
            r#"{"breakout":{"lives":5},"pong":{"win_score":3},"invaders":{"shot_cooldown":10}}"#,
        );
        let tuning = Tuning::load(&store);
        assert_eq!(tuning.breakout.lives, 5);
        assert_eq!(tuning.breakout.start_speed, 4.5);
        assert_eq!(tuning.pong.win_score, 3);
        assert_eq!(tuning.invaders.shot_cooldown, 10);
        assert_eq!(tuning.invaders.fire_interval, 120);
        assert_eq!(tuning.lights_out, LightsOutTuning::default());
    }

    #[test]
    fn test_full_document_round_trips() {
        let mut store = MemoryStore::new();
        let mut tuning = Tuning::default();
        tuning.lights_out.hard_moves = 20;
        store.insert_raw(Tuning::STORAGE_KEY, &serde_json::to_string(&tuning).unwrap());
        assert_eq!(Tuning::load(&store), tuning);
    }

    #[test]
    fn test_unreadable_falls_back() {
        let store = MemoryStore::failing();
        assert_eq!(Tuning::load(&store), Tuning::default());
    }
}
