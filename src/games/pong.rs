//! Pong
//!
//! Player on the left, a tracking AI on the right, first to seven. Each AI
//! point costs the player a life, so the run ends either way through the
//! same progress bookkeeping as Breakout.

use std::f32::consts::{FRAC_PI_4, FRAC_PI_8};

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use crate::Color;
use crate::engine::Game;
use crate::renderer::{Align, Frame, draw_entities};
use crate::sim::{
    Aabb, Bounds, Control, EntityKind, Facing, GameEvent, InputSnapshot, PaddleRule, Shape, Team,
    Walls, World, integrate, paddle_catches, paddle_rebound, reflect_in_bounds,
};
use crate::tuning::PongTuning;

pub const ID: &str = "pong";

pub const WIDTH: f32 = 400.0;
pub const HEIGHT: f32 = 300.0;

pub const PADDLE_W: f32 = 10.0;
pub const PADDLE_H: f32 = 60.0;
/// Gap between each paddle and its goal line
pub const PADDLE_INSET: f32 = 10.0;
pub const BALL_R: f32 = 6.0;

const PLAYER_RULE: PaddleRule = PaddleRule {
    facing: Facing::Right,
    max_angle: FRAC_PI_4,
    tolerance: 0.0,
    clearance: 1.0,
};

const AI_RULE: PaddleRule = PaddleRule {
    facing: Facing::Left,
    max_angle: FRAC_PI_4,
    tolerance: 2.0,
    clearance: 1.0,
};

const BOUNDS: Bounds = Bounds {
    area: Aabb {
        min: Vec2::ZERO,
        max: Vec2::new(WIDTH, HEIGHT),
    },
    walls: Walls::OPEN_SIDES,
};

/// Pong with its balance values
#[derive(Debug, Clone, Default)]
pub struct Pong {
    pub tuning: PongTuning,
}

#[derive(Debug, Clone, Serialize)]
pub struct PongState {
    pub world: World,
    pub player: usize,
    pub ai: usize,
    pub ball: usize,
    /// Points scored by the AI
    pub ai_score: u32,
    pub speed: f32,
}

/// Who took the point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Point {
    Player,
    Ai,
}

/// Move a paddle center toward `target` by at most `max`, kept on the field
fn approach(pos: &mut f32, target: f32, max: f32) {
    *pos += (target - *pos).clamp(-max, max);
    *pos = pos.clamp(PADDLE_H * 0.5, HEIGHT - PADDLE_H * 0.5);
}

impl Pong {
    pub fn new(tuning: PongTuning) -> Self {
        Self { tuning }
    }

    /// Serve from the center at a shallow random angle toward either side
    fn serve(&self, state: &mut PongState) {
        state.speed = self.tuning.start_speed;
        let angle = state.world.random_range(-FRAC_PI_8, FRAC_PI_8);
        let dir = if state.world.rng().random_bool(0.5) { 1.0 } else { -1.0 };
        let ball = &mut state.world.entities[state.ball];
        ball.pos = Vec2::new(WIDTH * 0.5, HEIGHT * 0.5);
        ball.vel = Vec2::new(dir * angle.cos(), angle.sin()) * state.speed;
        state.world.emit(GameEvent::Launched);
    }

    fn move_paddles(&self, state: &mut PongState, input: &InputSnapshot) {
        let keys = input.held.contains(Control::Up) || input.held.contains(Control::Down);
        let player = &mut state.world.entities[state.player].pos.y;
        if keys {
            let dir = input.held.axis(Control::Up, Control::Down);
            let target = *player + dir * self.tuning.paddle_key_speed;
            approach(player, target, f32::MAX);
        } else if let Some(pointer) = input.pointer {
            approach(player, pointer.y, self.tuning.paddle_pointer_speed);
        }

        let ball_y = state.world.entities[state.ball].pos.y;
        let ai = &mut state.world.entities[state.ai].pos.y;
        approach(ai, ball_y, self.tuning.ai_speed);
    }

    fn bounce_paddles(&self, state: &mut PongState) {
        for (paddle, rule) in [(state.player, PLAYER_RULE), (state.ai, AI_RULE)] {
            let bounds = state.world.entities[paddle].bounds();
            let ball = &mut state.world.entities[state.ball];
            if paddle_catches(ball, &bounds, &rule) {
                state.speed = (state.speed + self.tuning.speed_step).min(self.tuning.max_speed);
                paddle_rebound(ball, &bounds, &rule, state.speed);
                state.world.emit(GameEvent::PaddleHit);
                break;
            }
        }
    }

    /// Book a point. Returns true if the run ended.
    fn score(&self, state: &mut PongState, point: Point) -> bool {
        match point {
            Point::Player => {
                state.world.progress.award(1);
                state.world.emit(GameEvent::TargetHit {
                    points: 1,
                    destroyed: true,
                });
                if state.world.progress.score >= u64::from(self.tuning.win_score) {
                    state.world.end_run(true);
                    return true;
                }
            }
            Point::Ai => {
                state.ai_score += 1;
                let out = state.world.progress.lose_life();
                let remaining = state.world.progress.lives;
                state.world.emit(GameEvent::LifeLost { remaining });
                if out {
                    state.world.end_run(false);
                    return true;
                }
            }
        }
        false
    }
}

impl Game for Pong {
    type State = PongState;

    fn id(&self) -> &'static str {
        ID
    }

    fn title(&self) -> &'static str {
        "PONG"
    }

    fn instructions(&self) -> &'static [&'static str] {
        &["Mouse or Up/Down arrows, first to 7"]
    }

    fn size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn fresh_state(&self, seed: u64) -> PongState {
        let mut world = World::new(seed, self.tuning.win_score);
        let paddle = Shape::rect(PADDLE_W, PADDLE_H);
        let player = world.spawn(
            EntityKind::Paddle { team: Team::Player },
            Vec2::new(PADDLE_INSET + PADDLE_W * 0.5, HEIGHT * 0.5),
            paddle,
        );
        let ai = world.spawn(
            EntityKind::Paddle {
                team: Team::Opponent,
            },
            Vec2::new(WIDTH - PADDLE_INSET - PADDLE_W * 0.5, HEIGHT * 0.5),
            paddle,
        );
        let ball = world.spawn(
            EntityKind::Ball { attached: false },
            Vec2::new(WIDTH * 0.5, HEIGHT * 0.5),
            Shape::Circle { radius: BALL_R },
        );

        PongState {
            world,
            player,
            ai,
            ball,
            ai_score: 0,
            speed: self.tuning.start_speed,
        }
    }

    fn world<'a>(&self, state: &'a PongState) -> &'a World {
        &state.world
    }

    fn world_mut<'a>(&self, state: &'a mut PongState) -> &'a mut World {
        &mut state.world
    }

    fn on_start(&self, state: &mut PongState) {
        self.serve(state);
    }

    fn step(&self, state: &mut PongState, input: &InputSnapshot) {
        self.move_paddles(state, input);
        integrate(&mut state.world.entities);

        if reflect_in_bounds(&mut state.world.entities[state.ball], &BOUNDS).any() {
            state.world.emit(GameEvent::WallHit);
        }
        self.bounce_paddles(state);

        let x = state.world.entities[state.ball].pos.x;
        let point = if x < 0.0 {
            Some(Point::Ai)
        } else if x > WIDTH {
            Some(Point::Player)
        } else {
            None
        };
        if let Some(point) = point {
            if !self.score(state, point) {
                self.serve(state);
            }
        }
    }

    fn draw(&self, state: &PongState, frame: &mut Frame) {
        let world = &state.world;
        frame.dashed_line(
            Vec2::new(WIDTH * 0.5, 0.0),
            Vec2::new(WIDTH * 0.5, HEIGHT),
            Color::DIM,
            2.0,
            8.0,
        );
        draw_entities(frame, &world.entities);

        if frame.show_hud() {
            frame.title(
                world.progress.score.to_string(),
                Vec2::new(WIDTH * 0.5 - 50.0, 36.0),
                28.0,
                Color::CYAN,
                8.0,
            );
            frame.title(
                state.ai_score.to_string(),
                Vec2::new(WIDTH * 0.5 + 50.0, 36.0),
                28.0,
                Color::MAGENTA,
                8.0,
            );
            frame.text(
                format!("FIRST TO {}", self.tuning.win_score),
                Vec2::new(10.0, HEIGHT - 8.0),
                10.0,
                Align::Left,
                Color::DIM,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::bridge::RecordingSink;
    use crate::engine::{Engine, Runtime};
    use crate::persistence::MemoryStore;
    use crate::sim::Phase;

    fn playing(seed: u64) -> (PongState, Pong) {
        let game = Pong::default();
        let mut state = game.fresh_state(seed);
        state.world.transition(crate::sim::Trigger::Start);
        game.on_start(&mut state);
        (state, game)
    }

    fn place_ball(state: &mut PongState, pos: Vec2, vel: Vec2) {
        let ball = &mut state.world.entities[state.ball];
        ball.pos = pos;
        ball.vel = vel;
    }

    #[test]
    fn test_serve_from_center() {
        for seed in 0..20 {
            let (state, _) = playing(seed);
            let ball = state.world.entities[state.ball];
            assert_eq!(ball.pos, Vec2::new(200.0, 150.0));
            assert!((ball.vel.length() - 4.0).abs() < 1e-4);
            let angle = (ball.vel.y / ball.vel.length()).asin().abs();
            assert!(angle <= FRAC_PI_8 + 1e-4);
        }
    }

    #[test]
    fn test_player_center_hit_is_flat() {
        let (mut state, game) = playing(1);
        let input = InputSnapshot::default();
        // Ball heading at the player paddle's center, one step from contact
        place_ball(&mut state, Vec2::new(29.0, 150.0), Vec2::new(-4.0, 0.0));
        state.world.entities[state.ai].pos.y = 150.0;
        game.step(&mut state, &input);

        let ball = state.world.entities[state.ball];
        assert!((ball.vel.x - 4.3).abs() < 1e-4);
        assert!(ball.vel.y.abs() < 1e-4);
        assert_eq!(ball.pos.x, 20.0 + BALL_R + 1.0);
        assert!((state.speed - 4.3).abs() < 1e-4);
    }

    #[test]
    fn test_speed_caps() {
        let (mut state, game) = playing(1);
        state.speed = 13.9;
        place_ball(&mut state, Vec2::new(29.0, 150.0), Vec2::new(-4.0, 0.0));
        game.step(&mut state, &InputSnapshot::default());
        assert_eq!(state.speed, 14.0);
    }

    #[test]
    fn test_ai_point_costs_life_and_resets_speed() {
        let (mut state, game) = playing(2);
        state.speed = 9.0;
        // Far from the player paddle, about to cross the left goal line
        state.world.entities[state.player].pos.y = 40.0;
        place_ball(&mut state, Vec2::new(2.0, 280.0), Vec2::new(-4.0, 0.0));
        game.step(&mut state, &InputSnapshot::default());

        assert_eq!(state.ai_score, 1);
        assert_eq!(state.world.progress.lives, 6);
        assert_eq!(state.speed, 4.0);
        assert_eq!(state.world.entities[state.ball].pos, Vec2::new(200.0, 150.0));
    }

    #[test]
    fn test_keys_override_pointer() {
        let (mut state, game) = playing(3);
        let mut input = InputSnapshot {
            pointer: Some(Vec2::new(0.0, 300.0)),
            ..Default::default()
        };
        input.held.insert(Control::Up);
        game.step(&mut state, &input);
        assert_eq!(state.world.entities[state.player].pos.y, 144.0);

        input.held.remove(Control::Up);
        game.step(&mut state, &input);
        assert_eq!(state.world.entities[state.player].pos.y, 151.0);
    }

    #[test]
    fn test_player_wins_at_seven() {
        let sink = Rc::new(RefCell::new(RecordingSink::default()));
        let mut engine = Engine::new(
            Pong::default(),
            4,
            Box::new(MemoryStore::new()),
            Box::new(sink.clone()),
        );
        Runtime::input(&mut engine).press(None);
        engine.step();
        assert_eq!(engine.world().phase, Phase::Playing);

        for _ in 0..7 {
            let state = engine.state_mut();
            state.world.entities[state.ai].pos.y = 20.0;
            let ball = &mut state.world.entities[state.ball];
            ball.pos = Vec2::new(WIDTH - 2.0, 280.0);
            ball.vel = Vec2::new(4.0, 0.0);
            engine.step();
        }

        assert_eq!(engine.world().phase, Phase::Over);
        assert_eq!(engine.world().progress.score, 7);
        let sink = sink.borrow();
        assert_eq!(sink.scores.len(), 1);
        assert_eq!(sink.scores[0].score, 7);
        assert!(engine.render().texts().any(|t| t == "YOU WIN"));
    }
}
