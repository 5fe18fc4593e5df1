//! Concrete games
//!
//! Each game supplies its entities, collision rules and phase triggers on top
//! of the shared engine. `launch` builds a boxed runtime by id so a host can
//! mount any of them the same way.

pub mod breakout;
pub mod invaders;
pub mod lights_out;
pub mod pong;

pub use breakout::Breakout;
pub use invaders::Invaders;
pub use lights_out::LightsOut;
pub use pong::Pong;

use crate::bridge::EventSink;
use crate::engine::{Engine, Runtime};
use crate::persistence::KeyValueStore;
use crate::tuning::Tuning;

/// Ids of every game this crate can mount
pub const GAME_IDS: [&str; 4] = [breakout::ID, pong::ID, invaders::ID, lights_out::ID];

/// Build an engine for `game_id`, with tuning read from `store`.
/// Returns `None` for an unknown id.
pub fn launch(
    game_id: &str,
    seed: u64,
    store: Box<dyn KeyValueStore>,
    sink: Box<dyn EventSink>,
) -> Option<Box<dyn Runtime>> {
    let tuning = Tuning::load(store.as_ref());
    let runtime: Box<dyn Runtime> = match game_id {
        breakout::ID => {
            Box::new(Engine::new(Breakout::new(tuning.breakout), seed, store, sink))
        }
        pong::ID => Box::new(Engine::new(Pong::new(tuning.pong), seed, store, sink)),
        invaders::ID => {
            Box::new(Engine::new(Invaders::new(tuning.invaders), seed, store, sink))
        }
        lights_out::ID => {
            Box::new(Engine::new(LightsOut::new(tuning.lights_out), seed, store, sink))
        }
        other => {
            log::warn!("Unknown game id: {other}");
            return None;
        }
    };
    Some(runtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::LogSink;
    use crate::persistence::MemoryStore;
    use crate::sim::Phase;

    #[test]
    fn test_launch_every_game() {
        for id in GAME_IDS {
            let store = Box::new(MemoryStore::new());
            let runtime = launch(id, 1, store, Box::new(LogSink)).unwrap();
            assert_eq!(runtime.game_id(), id);
            assert_eq!(runtime.phase(), Phase::Idle);
        }
        assert!(launch("tetris", 1, Box::new(MemoryStore::new()), Box::new(LogSink)).is_none());
    }

    #[test]
    fn test_launch_applies_tuning() {
        let mut store = MemoryStore::new();
        store.insert_raw(Tuning::STORAGE_KEY, r#"{"pong":{"win_score":3}}"#);
        let mut runtime = launch(pong::ID, 1, Box::new(store), Box::new(LogSink)).unwrap();
        runtime.input().press(None);
        runtime.step();
        assert_eq!(runtime.phase(), Phase::Playing);
        assert!(runtime.render().texts().any(|t| t == "FIRST TO 3"));
    }
}
