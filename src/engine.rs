//! Engine instance
//!
//! One `Engine` owns everything a running game needs: the game's state, the
//! input sampler, settings, the key/value store and the event sink. Nothing
//! lives in module-level statics, so several engines can run side by side
//! (and tests can drive one without a browser).
//!
//! Per step the engine:
//! 1. Takes one input snapshot
//! 2. Routes phase commands (start, continue, restart, pause)
//! 3. Advances the game if it is playing
//! 4. Drains world events and finalizes a finished run exactly once

use std::fmt::Debug;

use glam::Vec2;

use crate::Color;
use crate::bridge::{Achievements, EventSink, ScoreRecord};
use crate::highscores::HighScores;
use crate::persistence::KeyValueStore;
use crate::renderer::{Align, Frame, Surface};
use crate::settings::Settings;
use crate::sim::{Command, GameEvent, InputSampler, InputSnapshot, Phase, Trigger, World};

/// A concrete game plugged into the shared engine skeleton
pub trait Game {
    type State: Clone + Debug;

    /// Stable id used for best scores and achievements
    fn id(&self) -> &'static str;

    /// Display name for overlays
    fn title(&self) -> &'static str;

    /// Control hints shown on the start overlay
    fn instructions(&self) -> &'static [&'static str] {
        &[]
    }

    /// Logical field size
    fn size(&self) -> Vec2;

    /// Brand new, fully-defined state for a run
    fn fresh_state(&self, seed: u64) -> Self::State;

    fn world<'a>(&self, state: &'a Self::State) -> &'a World;

    fn world_mut<'a>(&self, state: &'a mut Self::State) -> &'a mut World;

    /// Called right after the run leaves `Idle`
    fn on_start(&self, _state: &mut Self::State) {}

    /// Called when a level-up intermission is dismissed
    fn on_continue(&self, _state: &mut Self::State) {}

    /// Advance one step. Only called while playing; `input.commands` holds the
    /// primary presses not consumed by phase routing.
    fn step(&self, state: &mut Self::State, input: &InputSnapshot);

    /// Paint the field and HUD. Must not change anything.
    fn draw(&self, state: &Self::State, frame: &mut Frame);
}

/// Object-safe handle a host uses to drive whichever game it mounted
pub trait Runtime {
    fn game_id(&self) -> &'static str;
    fn size(&self) -> Vec2;
    fn phase(&self) -> Phase;
    fn input(&mut self) -> &mut InputSampler;
    /// Advance one simulation step
    fn step(&mut self);
    /// Build the current frame without advancing anything
    fn render(&self) -> Frame;
    /// One display refresh. Returns false if the frame was skipped.
    fn frame(&mut self, surface: Option<&mut dyn Surface>) -> bool;
    /// Pause if playing; used when the page loses focus
    fn suspend(&mut self);
}

/// A running game instance
pub struct Engine<G: Game> {
    game: G,
    state: G::State,
    input: InputSampler,
    settings: Settings,
    store: Box<dyn KeyValueStore>,
    sink: Box<dyn EventSink>,
    /// Seed of the current run
    seed: u64,
    /// Stored best for this game
    best: u64,
    /// Outcome of the last finished run, for the game-over overlay
    last_result: Option<(ScoreRecord, bool)>,
}

/// Derive the seed for the next run from the previous one
fn next_seed(seed: u64) -> u64 {
    seed.wrapping_add(0x9e37_79b9_7f4a_7c15)
}

impl<G: Game> Engine<G> {
    /// Create an engine in `Idle`, loading settings and the best score from `store`
    pub fn new(
        game: G,
        seed: u64,
        store: Box<dyn KeyValueStore>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        let settings = Settings::load(store.as_ref());
        let best = HighScores::load(store.as_ref()).best(game.id());
        let mut state = game.fresh_state(seed);
        game.world_mut(&mut state).particle_cap = settings.max_particles();
        log::info!("{} ready (seed {seed}, best {best})", game.id());

        Self {
            game,
            state,
            input: InputSampler::new(),
            settings,
            store,
            sink,
            seed,
            best,
            last_result: None,
        }
    }

    /// Replace the loaded settings, e.g. after the player changed them
    pub fn set_settings(&mut self, settings: Settings) {
        settings.save(self.store.as_mut());
        self.settings = settings;
        let cap = self.settings.max_particles();
        self.world_mut().particle_cap = cap;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn state(&self) -> &G::State {
        &self.state
    }

    /// Direct state access for hosts and tests
    pub fn state_mut(&mut self) -> &mut G::State {
        &mut self.state
    }

    pub fn world(&self) -> &World {
        self.game.world(&self.state)
    }

    fn world_mut(&mut self) -> &mut World {
        self.game.world_mut(&mut self.state)
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Throw the current run away and begin a new one with a fresh state.
    /// The new run starts playing immediately.
    pub fn restart(&mut self) {
        self.seed = next_seed(self.seed);
        let mut state = self.game.fresh_state(self.seed);
        self.game.world_mut(&mut state).particle_cap = self.settings.max_particles();
        self.state = state;
        self.last_result = None;
        self.input.release_all();
        self.begin();
    }

    fn begin(&mut self) {
        if self.world_mut().transition(Trigger::Start) {
            self.world_mut().emit(GameEvent::Started);
            self.game.on_start(&mut self.state);
        }
    }

    fn toggle_pause(&mut self) {
        let world = self.world_mut();
        if world.transition(Trigger::Pause) {
            let event = if world.phase == Phase::Paused {
                GameEvent::Paused
            } else {
                GameEvent::Resumed
            };
            world.emit(event);
        }
    }

    /// Route one command by phase. Primary presses during play are handed on
    /// to the game; anything irrelevant to the phase is dropped.
    fn route(&mut self, command: Command, passthrough: &mut Vec<Command>) {
        match command {
            Command::Pause => self.toggle_pause(),
            Command::Primary { .. } => match self.world().phase {
                Phase::Idle => self.begin(),
                Phase::LevelUp => {
                    if self.world_mut().transition(Trigger::Continue) {
                        let level = self.world().progress.level;
                        self.world_mut().emit(GameEvent::Continued { level });
                        self.game.on_continue(&mut self.state);
                    }
                }
                Phase::Over => {
                    if self.world().phase.on(Trigger::Restart).is_some() {
                        log::info!("Restarting {}", self.game.id());
                        self.restart();
                    }
                }
                Phase::Playing => passthrough.push(command),
                Phase::Paused => log::debug!("primary ignored while paused"),
            },
        }
    }

    /// One simulation step, with no rendering
    pub fn step(&mut self) {
        let snapshot = self.input.snapshot();
        let mut passthrough = Vec::new();
        for command in snapshot.commands.iter().copied() {
            self.route(command, &mut passthrough);
        }

        if self.world().phase.is_active() {
            let input = InputSnapshot {
                held: snapshot.held,
                pointer: snapshot.pointer,
                commands: passthrough,
            };
            self.game.step(&mut self.state, &input);
            self.world_mut().time_ticks += 1;
        }

        self.drain_events();
    }

    fn drain_events(&mut self) {
        let events = std::mem::take(&mut self.world_mut().events);
        for event in events {
            log::trace!("{}: {:?}", self.game.id(), event);
            if let GameEvent::RunEnded { score, won } = event {
                if self.world().progress.has_ended() {
                    self.finish_run(score, won);
                } else {
                    log::warn!("{}: RunEnded without an ended run, ignored", self.game.id());
                }
            }
        }
    }

    /// Compare against the stored best, persist, and notify listeners
    fn finish_run(&mut self, score: u64, won: bool) {
        let game_id = self.game.id();
        let is_high_score = HighScores::record(self.store.as_mut(), game_id, score);
        let record = ScoreRecord {
            game_id: game_id.to_string(),
            score,
            is_high_score,
        };

        self.sink.score(&record);
        if is_high_score {
            self.best = score;
        }
        for id in Achievements::on_run_end(self.store.as_mut(), &record) {
            self.sink.unlock(&id);
        }

        self.last_result = Some((record, won));
    }

    /// Build the frame for the current state. Pure: calling it any number of
    /// times changes nothing.
    pub fn render(&self) -> Frame {
        let mut frame = Frame::new(self.game.size(), &self.settings);
        frame.clear(Color::BACKGROUND);
        self.game.draw(&self.state, &mut frame);

        let size = frame.size;
        if frame.show_hud() {
            let best = self.best.max(self.world().progress.score);
            frame.text(
                format!("BEST {best}"),
                Vec2::new(size.x - 10.0, size.y - 8.0),
                10.0,
                Align::Right,
                Color::DIM,
            );
        }

        match self.world().phase {
            Phase::Idle => {
                let mut lines = vec!["Click or press Space to start"];
                lines.extend_from_slice(self.game.instructions());
                frame.overlay(self.game.title(), Color::CYAN, &lines);
            }
            Phase::LevelUp => {
                let cleared = self.world().progress.level.saturating_sub(1);
                let title = format!("LEVEL {cleared} CLEAR");
                frame.overlay(&title, Color::GREEN, &["Click to continue"]);
            }
            Phase::Paused => frame.overlay("PAUSED", Color::CYAN, &["Press P or Esc to resume"]),
            Phase::Over => {
                let (title, color) = match &self.last_result {
                    Some((_, true)) => ("YOU WIN", Color::GREEN),
                    _ => ("GAME OVER", Color::MAGENTA),
                };
                let score = format!("Score: {}", self.world().progress.score);
                let best = match &self.last_result {
                    Some((record, _)) if record.is_high_score => "New best!".to_string(),
                    _ => format!("Best: {}", self.best),
                };
                let lines = [score.as_str(), best.as_str(), "Click to play again"];
                frame.overlay(title, color, &lines);
            }
            Phase::Playing => {}
        }

        frame
    }

    /// One display refresh: step then present. With no surface the whole
    /// frame is skipped and the caller keeps scheduling.
    pub fn frame(&mut self, surface: Option<&mut dyn Surface>) -> bool {
        let Some(surface) = surface else {
            // Presses made with nothing on screen must not replay later
            if self.input.pending() > 0 {
                log::debug!("no surface, dropping {} queued commands", self.input.pending());
                self.input.discard_commands();
            }
            log::trace!("no surface, skipping frame");
            return false;
        };
        self.step();
        let frame = self.render();
        surface.present(&frame);
        true
    }
}

impl<G: Game> Runtime for Engine<G> {
    fn game_id(&self) -> &'static str {
        self.game.id()
    }

    fn size(&self) -> Vec2 {
        self.game.size()
    }

    fn phase(&self) -> Phase {
        self.world().phase
    }

    fn input(&mut self) -> &mut InputSampler {
        &mut self.input
    }

    fn step(&mut self) {
        Engine::step(self);
    }

    fn render(&self) -> Frame {
        Engine::render(self)
    }

    fn frame(&mut self, surface: Option<&mut dyn Surface>) -> bool {
        Engine::frame(self, surface)
    }

    fn suspend(&mut self) {
        self.input.release_all();
        if self.world().phase == Phase::Playing {
            self.toggle_pause();
            self.drain_events();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::bridge::RecordingSink;
    use crate::persistence::MemoryStore;
    use crate::sim::Control;

    /// Minimal game: one point per step while Right is held, a primary press
    /// ends the run, and clearing ten points is a "wave"
    #[derive(Debug, Clone)]
    struct Tally;

    #[derive(Debug, Clone)]
    struct TallyState {
        world: World,
        continues: u32,
    }

    impl Game for Tally {
        type State = TallyState;

        fn id(&self) -> &'static str {
            "tally"
        }

        fn title(&self) -> &'static str {
            "TALLY"
        }

        fn size(&self) -> Vec2 {
            Vec2::new(100.0, 100.0)
        }

        fn fresh_state(&self, seed: u64) -> TallyState {
            TallyState {
                world: World::new(seed, 3),
                continues: 0,
            }
        }

        fn world<'a>(&self, state: &'a TallyState) -> &'a World {
            &state.world
        }

        fn world_mut<'a>(&self, state: &'a mut TallyState) -> &'a mut World {
            &mut state.world
        }

        fn on_continue(&self, state: &mut TallyState) {
            state.continues += 1;
        }

        fn step(&self, state: &mut TallyState, input: &InputSnapshot) {
            if input.held.contains(Control::Right) {
                state.world.progress.award(1);
            }
            if state.world.progress.score == 10 && state.continues == 0 {
                state.world.progress.next_level();
                state.world.transition(Trigger::WaveCleared);
                return;
            }
            if !input.commands.is_empty() {
                // Two end conditions in one step
                state.world.end_run(false);
                state.world.end_run(true);
            }
        }

        fn draw(&self, state: &TallyState, frame: &mut Frame) {
            frame.text(
                format!("{}", state.world.progress.score),
                Vec2::ZERO,
                10.0,
                Align::Left,
                Color::WHITE,
            );
        }
    }

    struct Canvas {
        presented: usize,
    }

    impl Surface for Canvas {
        fn present(&mut self, _frame: &Frame) {
            self.presented += 1;
        }
    }

    fn engine() -> (Engine<Tally>, Rc<RefCell<RecordingSink>>) {
        let sink = Rc::new(RefCell::new(RecordingSink::default()));
        let engine = Engine::new(Tally, 7, Box::new(MemoryStore::new()), Box::new(sink.clone()));
        (engine, sink)
    }

    fn press(engine: &mut Engine<Tally>) {
        engine.input.press(None);
        engine.step();
    }

    #[test]
    fn test_idle_until_primary() {
        let (mut engine, _) = engine();
        engine.input.key_down("ArrowRight", false);
        engine.step();
        assert_eq!(engine.world().phase, Phase::Idle);
        assert_eq!(engine.world().progress.score, 0);

        press(&mut engine);
        assert_eq!(engine.world().phase, Phase::Playing);
        // The start press is consumed by routing, the step still runs
        assert_eq!(engine.world().progress.score, 1);
    }

    #[test]
    fn test_levelup_continue() {
        let (mut engine, _) = engine();
        engine.input.key_down("ArrowRight", false);
        press(&mut engine);
        for _ in 0..20 {
            engine.step();
        }
        assert_eq!(engine.world().phase, Phase::LevelUp);
        assert_eq!(engine.world().progress.score, 10);

        press(&mut engine);
        assert_eq!(engine.world().phase, Phase::Playing);
        assert_eq!(engine.state().continues, 1);
        assert_eq!(engine.world().progress.score, 11);
    }

    #[test]
    fn test_single_emission_and_restart() {
        let (mut engine, sink) = engine();
        engine.input.key_down("ArrowRight", false);
        press(&mut engine);
        engine.input.key_up("ArrowRight");
        press(&mut engine);
        assert_eq!(engine.world().phase, Phase::Over);

        // Idle steps in Over never re-emit
        for _ in 0..5 {
            engine.step();
        }
        {
            let sink = sink.borrow();
            assert_eq!(sink.scores.len(), 1);
            assert_eq!(sink.scores[0].game_id, "tally");
            assert_eq!(sink.scores[0].score, 1);
            assert!(sink.scores[0].is_high_score);
            assert_eq!(sink.unlocks, vec!["first_tally".to_string(), "highscore".to_string()]);
        }

        let first_seed = engine.seed();
        press(&mut engine);
        assert_eq!(engine.world().phase, Phase::Playing);
        assert_eq!(engine.world().progress.score, 0);
        assert_eq!(engine.world().progress.lives, 3);
        assert_ne!(engine.seed(), first_seed);
        assert_eq!(engine.state().continues, 0);
    }

    #[test]
    fn test_pause_freezes_world() {
        let (mut engine, _) = engine();
        engine.input.key_down("ArrowRight", false);
        press(&mut engine);
        engine.input.key_down("p", false);
        engine.step();
        assert_eq!(engine.world().phase, Phase::Paused);
        let frozen = engine.world().progress.score;
        for _ in 0..3 {
            engine.step();
        }
        assert_eq!(engine.world().progress.score, frozen);
        // A primary press while paused is ignored
        press(&mut engine);
        assert_eq!(engine.world().phase, Phase::Paused);

        engine.input.key_down("Escape", false);
        engine.step();
        assert_eq!(engine.world().phase, Phase::Playing);
        assert_eq!(engine.world().progress.score, frozen + 1);
    }

    #[test]
    fn test_suspend_only_pauses_play() {
        let (mut engine, _) = engine();
        Runtime::suspend(&mut engine);
        assert_eq!(engine.world().phase, Phase::Idle);
        press(&mut engine);
        Runtime::suspend(&mut engine);
        assert_eq!(engine.world().phase, Phase::Paused);
    }

    #[test]
    fn test_missing_surface_skips_frame() {
        let (mut engine, _) = engine();
        engine.input.key_down("ArrowRight", false);
        engine.input.press(None);
        assert!(!engine.frame(None));
        assert_eq!(engine.world().phase, Phase::Idle);
        assert_eq!(engine.input.pending(), 0);

        let mut canvas = Canvas { presented: 0 };
        assert!(engine.frame(Some(&mut canvas)));
        assert_eq!(canvas.presented, 1);
        assert_eq!(engine.world().phase, Phase::Idle);

        // Held keys survive the gap, a fresh press starts the run
        engine.input.press(None);
        assert!(engine.frame(Some(&mut canvas)));
        assert_eq!(engine.world().phase, Phase::Playing);
        assert_eq!(engine.world().progress.score, 1);
    }

    #[test]
    fn test_presses_while_hidden_do_not_replay() {
        let (mut engine, sink) = engine();
        press(&mut engine);
        press(&mut engine);
        assert_eq!(engine.world().phase, Phase::Over);

        for _ in 0..3 {
            engine.input.press(None);
            assert!(!engine.frame(None));
        }
        let mut canvas = Canvas { presented: 0 };
        engine.frame(Some(&mut canvas));
        assert_eq!(engine.world().phase, Phase::Over);
        assert_eq!(sink.borrow().scores.len(), 1);
    }

    #[test]
    fn test_stray_run_ended_is_ignored() {
        let (mut engine, sink) = engine();
        press(&mut engine);
        engine.world_mut().emit(GameEvent::RunEnded { score: 99, won: true });
        engine.step();
        assert_eq!(engine.world().phase, Phase::Playing);
        assert!(sink.borrow().scores.is_empty());
        assert_eq!(engine.best(), 0);
    }

    #[test]
    fn test_render_is_pure() {
        let (mut engine, _) = engine();
        press(&mut engine);
        let before = format!("{:?}", engine.state());
        let a = engine.render();
        let b = engine.render();
        assert_eq!(a, b);
        assert_eq!(format!("{:?}", engine.state()), before);
    }

    #[test]
    fn test_overlays_follow_phase() {
        let (mut engine, _) = engine();
        assert!(engine.render().texts().any(|t| t == "TALLY"));
        press(&mut engine);
        assert!(!engine.render().texts().any(|t| t == "TALLY"));
        press(&mut engine);
        assert!(engine.render().texts().any(|t| t == "YOU WIN" || t == "GAME OVER"));
    }
}
