//! Breakout
//!
//! Paddle at the bottom, a fixed 5x8 brick grid, three lives. Clearing the grid
//! pauses for a level-up; the next wave is faster.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_6};

use glam::Vec2;
use serde::Serialize;

use crate::Color;
use crate::engine::Game;
use crate::renderer::{Align, Frame, draw_entity};
use crate::sim::{
    Aabb, Bounds, Control, EntityKind, Facing, GameEvent, InputSnapshot, PaddleRule, Shape, Team,
    Trigger, Walls, World, escaped, integrate, paddle_catches, paddle_rebound, reflect_in_bounds,
    resolve_targets, update_particles,
};
use crate::tuning::BreakoutTuning;

pub const ID: &str = "breakout";

pub const WIDTH: f32 = 400.0;
pub const HEIGHT: f32 = 500.0;

pub const PADDLE_W: f32 = 70.0;
pub const PADDLE_H: f32 = 10.0;
/// Top edge of the paddle
pub const PADDLE_Y: f32 = HEIGHT - 30.0;
pub const BALL_R: f32 = 7.0;

pub const BRICK_ROWS: usize = 5;
pub const BRICK_COLS: usize = 8;
pub const BRICK_W: f32 = 42.0;
pub const BRICK_H: f32 = 16.0;
pub const BRICK_GAP: f32 = 4.0;
pub const BRICK_LEFT: f32 = 14.0;
pub const BRICK_TOP: f32 = 60.0;

/// Color and value per row, top to bottom
pub const ROWS: [(Color, u32); BRICK_ROWS] = [
    (Color::hex(0xff00ff), 50),
    (Color::hex(0xff44aa), 40),
    (Color::hex(0xff8800), 30),
    (Color::hex(0xffee00), 20),
    (Color::hex(0x00e5ff), 10),
];

const PADDLE_RULE: PaddleRule = PaddleRule {
    facing: Facing::Up,
    max_angle: FRAC_PI_3,
    tolerance: 4.0,
    clearance: 0.0,
};

const BOUNDS: Bounds = Bounds {
    area: Aabb {
        min: Vec2::ZERO,
        max: Vec2::new(WIDTH, HEIGHT),
    },
    walls: Walls::OPEN_BOTTOM,
};

/// Total points on one full grid
pub fn grid_points() -> u64 {
    ROWS.iter().map(|(_, p)| u64::from(*p)).sum::<u64>() * BRICK_COLS as u64
}

/// Breakout with its balance values
#[derive(Debug, Clone, Default)]
pub struct Breakout {
    pub tuning: BreakoutTuning,
}

/// Everything one Breakout run owns
#[derive(Debug, Clone, Serialize)]
pub struct BreakoutState {
    pub world: World,
    /// Entity index of the paddle
    pub paddle: usize,
    /// Entity index of the ball
    pub ball: usize,
    /// Launch speed for the current level
    pub base_speed: f32,
    /// Current ball speed
    pub speed: f32,
    /// Free-flight steps since the last speed bump
    pub speed_timer: u32,
}

impl BreakoutState {
    pub fn ball_attached(&self) -> bool {
        matches!(
            self.world.entities[self.ball].kind,
            EntityKind::Ball { attached: true }
        )
    }

    fn set_attached(&mut self, attached: bool) {
        self.world.entities[self.ball].kind = EntityKind::Ball { attached };
    }

    /// Put the ball back on the paddle
    fn reattach(&mut self) {
        self.set_attached(true);
        let paddle_x = self.world.entities[self.paddle].pos.x;
        let ball = &mut self.world.entities[self.ball];
        ball.vel = Vec2::ZERO;
        ball.pos = Vec2::new(paddle_x, PADDLE_Y - BALL_R - 1.0);
    }
}

/// Lay out a full grid of bricks
fn spawn_bricks(world: &mut World) {
    for (row, (color, points)) in ROWS.iter().enumerate() {
        for col in 0..BRICK_COLS {
            let x = BRICK_LEFT + col as f32 * (BRICK_W + BRICK_GAP);
            let y = BRICK_TOP + row as f32 * (BRICK_H + BRICK_GAP);
            world.spawn(
                EntityKind::Brick {
                    hp: 1,
                    points: *points,
                    color: *color,
                },
                Vec2::new(x + BRICK_W * 0.5, y + BRICK_H * 0.5),
                Shape::rect(BRICK_W, BRICK_H),
            );
        }
    }
}

impl Breakout {
    pub fn new(tuning: BreakoutTuning) -> Self {
        Self { tuning }
    }

    /// Keys take precedence; otherwise approach the pointer at a capped speed
    fn move_paddle(&self, state: &mut BreakoutState, input: &InputSnapshot) {
        let paddle = &mut state.world.entities[state.paddle];
        let keys = input.held.contains(Control::Left) || input.held.contains(Control::Right);

        if keys {
            let dir = input.held.axis(Control::Left, Control::Right);
            paddle.pos.x += dir * self.tuning.paddle_key_speed;
        } else if let Some(pointer) = input.pointer {
            let max = self.tuning.paddle_pointer_speed;
            paddle.pos.x += (pointer.x - paddle.pos.x).clamp(-max, max);
        }
        paddle.pos.x = paddle.pos.x.clamp(PADDLE_W * 0.5, WIDTH - PADDLE_W * 0.5);
    }

    fn launch(&self, state: &mut BreakoutState) {
        let angle = -FRAC_PI_2 + state.world.random_range(-FRAC_PI_6, FRAC_PI_6);
        state.speed = state.base_speed;
        state.speed_timer = 0;
        state.set_attached(false);
        state.world.entities[state.ball].vel = Vec2::new(angle.cos(), angle.sin()) * state.speed;
        state.world.emit(GameEvent::Launched);
    }

    fn ramp_speed(&self, state: &mut BreakoutState) {
        state.speed_timer += 1;
        if state.speed_timer < self.tuning.ramp_interval {
            return;
        }
        state.speed_timer = 0;
        state.speed = (state.speed + self.tuning.ramp_step).min(self.tuning.max_speed);
        let ball = &mut state.world.entities[state.ball];
        ball.vel = ball.vel.normalize_or_zero() * state.speed;
        log::debug!("ball speed now {:.1}", state.speed);
    }

    fn clear_wave(&self, state: &mut BreakoutState) {
        state.world.progress.next_level();
        state.base_speed = (state.base_speed + self.tuning.level_speed_bonus)
            .min(self.tuning.max_level_speed);
        state.speed_timer = 0;
        if state.world.transition(Trigger::WaveCleared) {
            let level = state.world.progress.level;
            state.world.emit(GameEvent::WaveCleared { level });
        }
    }

    /// Pointer position that keeps the paddle under the ball, for demos.
    /// Returns `None` when there is nothing to chase.
    pub fn autopilot(state: &BreakoutState) -> Option<Vec2> {
        let ball = state.world.entities.get(state.ball)?;
        if !ball.alive {
            return None;
        }
        // Aim slightly off center so rebounds are not all vertical
        let lean = if ball.vel.x >= 0.0 { -8.0 } else { 8.0 };
        Some(Vec2::new(ball.pos.x + lean, PADDLE_Y))
    }
}

impl Game for Breakout {
    type State = BreakoutState;

    fn id(&self) -> &'static str {
        ID
    }

    fn title(&self) -> &'static str {
        "BREAKOUT"
    }

    fn instructions(&self) -> &'static [&'static str] {
        &["Mouse or arrows move the paddle"]
    }

    fn size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn fresh_state(&self, seed: u64) -> BreakoutState {
        let mut world = World::new(seed, self.tuning.lives);
        let paddle = world.spawn(
            EntityKind::Paddle { team: Team::Player },
            Vec2::new(WIDTH * 0.5, PADDLE_Y + PADDLE_H * 0.5),
            Shape::rect(PADDLE_W, PADDLE_H),
        );
        let ball = world.spawn(
            EntityKind::Ball { attached: true },
            Vec2::new(WIDTH * 0.5, PADDLE_Y - BALL_R - 1.0),
            Shape::Circle { radius: BALL_R },
        );
        spawn_bricks(&mut world);

        BreakoutState {
            world,
            paddle,
            ball,
            base_speed: self.tuning.start_speed,
            speed: self.tuning.start_speed,
            speed_timer: 0,
        }
    }

    fn world<'a>(&self, state: &'a BreakoutState) -> &'a World {
        &state.world
    }

    fn world_mut<'a>(&self, state: &'a mut BreakoutState) -> &'a mut World {
        &mut state.world
    }

    /// Next wave: fresh grid, ball back on the paddle. Score and lives carry over.
    fn on_continue(&self, state: &mut BreakoutState) {
        state.world.remove_where(|e| e.is_brick());
        spawn_bricks(&mut state.world);
        state.reattach();
        state.speed = state.base_speed;
    }

    fn step(&self, state: &mut BreakoutState, input: &InputSnapshot) {
        self.move_paddle(state, input);

        if state.ball_attached() {
            state.reattach();
            if !input.commands.is_empty() {
                self.launch(state);
            }
        } else {
            self.ramp_speed(state);
        }

        integrate(&mut state.world.entities);

        let ball = &mut state.world.entities[state.ball];
        if reflect_in_bounds(ball, &BOUNDS).any() {
            state.world.emit(GameEvent::WallHit);
        }

        let paddle = state.world.entities[state.paddle].bounds();
        let ball = &mut state.world.entities[state.ball];
        if paddle_catches(ball, &paddle, &PADDLE_RULE) {
            let speed = ball.vel.length();
            paddle_rebound(ball, &paddle, &PADDLE_RULE, speed);
            state.world.emit(GameEvent::PaddleHit);
        }

        if escaped(&state.world.entities[state.ball], &BOUNDS) {
            let out = state.world.progress.lose_life();
            let remaining = state.world.progress.lives;
            state.world.emit(GameEvent::LifeLost { remaining });
            if out {
                state.world.end_run(false);
                return;
            }
            state.reattach();
        }

        let debris = self.tuning.particles_per_brick;
        if let Some(impact) = resolve_targets(&mut state.world, state.ball, debris) {
            state.world.emit(GameEvent::TargetHit {
                points: impact.points,
                destroyed: impact.destroyed,
            });
        }

        if state.world.bricks_alive() == 0 {
            self.clear_wave(state);
        }

        update_particles(&mut state.world.entities);
    }

    fn draw(&self, state: &BreakoutState, frame: &mut Frame) {
        let world = &state.world;

        if frame.show_hud() {
            frame.text(
                format!("SCORE: {}", world.progress.score),
                Vec2::new(10.0, 22.0),
                13.0,
                Align::Left,
                Color::CYAN,
            );
            frame.text(
                format!("LEVEL: {}", world.progress.level),
                Vec2::new(WIDTH - 10.0, 22.0),
                13.0,
                Align::Right,
                Color::CYAN,
            );
            for i in 0..world.progress.lives {
                frame.circle(
                    Vec2::new(WIDTH * 0.5 - 16.0 + f32::from(i) * 16.0, 14.0),
                    5.0,
                    Color::MAGENTA,
                    6.0,
                );
            }
        }

        for brick in world.entities.iter().filter(|e| e.alive && e.is_brick()) {
            draw_entity(frame, brick);
            let b = brick.bounds();
            frame.rect(
                Aabb::from_corner(b.min.x + 2.0, b.min.y + 2.0, BRICK_W - 4.0, 4.0),
                Color::WHITE.with_alpha(46),
                0.0,
            );
        }
        for particle in world.entities.iter().filter(|e| e.is_particle()) {
            draw_entity(frame, particle);
        }
        draw_entity(frame, &world.entities[state.paddle]);
        draw_entity(frame, &world.entities[state.ball]);
    }
}
