//! Outbound notifications for the rest of the site
//!
//! The engine reports finished runs and achievement unlocks through an
//! `EventSink` and never learns who is listening (toasts, coin rewards,
//! remote sync).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;

/// The one record a finished run produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub game_id: String,
    pub score: u64,
    pub is_high_score: bool,
}

/// Fire-and-forget listener for run results and unlocks
pub trait EventSink {
    fn score(&mut self, record: &ScoreRecord);
    fn unlock(&mut self, achievement: &str);
}

/// Sink that only writes to the log
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn score(&mut self, record: &ScoreRecord) {
        log::info!(
            "{} finished with {} points{}",
            record.game_id,
            record.score,
            if record.is_high_score { " (new best)" } else { "" }
        );
    }

    fn unlock(&mut self, achievement: &str) {
        log::info!("Achievement unlocked: {achievement}");
    }
}

/// Sink that keeps everything it receives
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub scores: Vec<ScoreRecord>,
    pub unlocks: Vec<String>,
}

impl EventSink for RecordingSink {
    fn score(&mut self, record: &ScoreRecord) {
        self.scores.push(record.clone());
    }

    fn unlock(&mut self, achievement: &str) {
        self.unlocks.push(achievement.to_string());
    }
}

/// Shared handle so a test or host can read what a boxed sink received
impl<S: EventSink> EventSink for std::rc::Rc<std::cell::RefCell<S>> {
    fn score(&mut self, record: &ScoreRecord) {
        self.borrow_mut().score(record);
    }

    fn unlock(&mut self, achievement: &str) {
        self.borrow_mut().unlock(achievement);
    }
}

/// Achievement ids this runtime can unlock
pub mod ids {
    /// Beat a stored best in any game
    pub const HIGH_SCORE: &str = "highscore";
    /// Finish runs in five different games
    pub const GAMER: &str = "gamer";
    /// Prefix for "finished a run of <game>"
    pub const FIRST_RUN_PREFIX: &str = "first_";

    pub const GAMER_THRESHOLD: usize = 5;
}

/// Persisted set of games that have finished at least one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievements {
    pub played: BTreeSet<String>,
}

impl Achievements {
    pub const STORAGE_KEY: &'static str = "neon_arcade_played";

    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get_json::<Achievements>(Self::STORAGE_KEY) {
            Ok(found) => found.unwrap_or_default(),
            Err(e) => {
                log::warn!("Achievement progress unreadable: {e}");
                Self::default()
            }
        }
    }

    /// Work out which unlocks a finished run earns, persist progress, and
    /// return the ids to signal.
    pub fn on_run_end(store: &mut dyn KeyValueStore, record: &ScoreRecord) -> Vec<String> {
        let mut progress = Self::load(store);
        let mut unlocks = Vec::new();

        if progress.played.insert(record.game_id.clone()) {
            unlocks.push(format!("{}{}", ids::FIRST_RUN_PREFIX, record.game_id));
            if progress.played.len() == ids::GAMER_THRESHOLD {
                unlocks.push(ids::GAMER.to_string());
            }
            if let Err(e) = store.set_json(Self::STORAGE_KEY, &progress) {
                log::warn!("Achievement progress not saved: {e}");
            }
        }
        if record.is_high_score {
            unlocks.push(ids::HIGH_SCORE.to_string());
        }

        unlocks
    }
}

/// Browser sink: dispatches `game-score` and `achievement-unlocked`
/// `CustomEvent`s on `window` with JSON details.
#[cfg(target_arch = "wasm32")]
pub struct DomEventSink;

#[cfg(target_arch = "wasm32")]
impl DomEventSink {
    pub const SCORE_EVENT: &'static str = "game-score";
    pub const UNLOCK_EVENT: &'static str = "achievement-unlocked";

    fn dispatch(name: &str, detail_json: &str) {
        let Some(window) = web_sys::window() else { return };
        let Ok(detail) = js_sys::JSON::parse(detail_json) else { return };
        let init = web_sys::CustomEventInit::new();
        init.set_detail(&detail);
        match web_sys::CustomEvent::new_with_event_init_dict(name, &init) {
            Ok(event) => {
                let _ = window.dispatch_event(&event);
            }
            Err(e) => log::warn!("Could not create {name} event: {e:?}"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl EventSink for DomEventSink {
    fn score(&mut self, record: &ScoreRecord) {
        if let Ok(json) = serde_json::to_string(record) {
            Self::dispatch(Self::SCORE_EVENT, &json);
        }
    }

    fn unlock(&mut self, achievement: &str) {
        let json = serde_json::json!({ "id": achievement }).to_string();
        Self::dispatch(Self::UNLOCK_EVENT, &json);
    }
}
