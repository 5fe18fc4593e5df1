//! Space Invaders
//!
//! A marching 4x8 formation, four shield bunkers and a ship with three lives.
//! Invaders and shield blocks are brick targets; both sides shoot team-tagged
//! projectiles. Enemy shots pass through their own ranks and only chip
//! shields or hit the ship. The run is lost when lives run out or the
//! formation reaches the ground.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use crate::Color;
use crate::engine::Game;
use crate::renderer::{Align, Frame, draw_entity};
use crate::sim::{
    Aabb, Control, Entity, EntityKind, GameEvent, InputSnapshot, Shape, Team, Trigger, World,
    integrate, resolve_targets, resolve_targets_where, update_particles,
};
use crate::tuning::InvadersTuning;

pub const ID: &str = "invaders";

pub const WIDTH: f32 = 400.0;
pub const HEIGHT: f32 = 500.0;

/// Line the formation must not reach
pub const GROUND: f32 = HEIGHT - 18.0;

pub const ROWS: usize = 4;
pub const COLS: usize = 8;
pub const INVADER_W: f32 = 36.0;
pub const INVADER_H: f32 = 30.0;
const INVADER_PAD_X: f32 = 8.0;
const INVADER_PAD_Y: f32 = 10.0;
const GRID_LEFT: f32 = 30.0;
const GRID_TOP: f32 = 60.0;
/// Later waves start this much lower
const WAVE_OFFSET: f32 = 10.0;
/// Margin that turns the formation around
const EDGE: f32 = 10.0;
const DROP: f32 = 16.0;

pub const SHIP_W: f32 = 36.0;
pub const SHIP_H: f32 = 24.0;

const SHOT_W: f32 = 3.0;
const SHOT_H: f32 = 12.0;

const SHIELD_X: [f32; 4] = [70.0, 160.0, 250.0, 330.0];
const SHIELD_BLOCK: f32 = 9.0;
const SHIELD_HP: u8 = 3;

const DEBRIS: usize = 6;

/// Shield blocks are bricks worth nothing
fn is_shield(e: &Entity) -> bool {
    matches!(e.kind, EntityKind::Brick { points: 0, .. })
}

fn is_invader(e: &Entity) -> bool {
    e.is_brick() && !is_shield(e)
}

fn is_shot(e: &Entity, side: Team) -> bool {
    matches!(e.kind, EntityKind::Projectile { team } if team == side)
}

/// Steps between two formation moves: fewer invaders and later waves march faster
pub fn march_interval(alive: usize, wave: u32) -> u32 {
    let slowdown = 50 - 2 * alive as i64 - 5 * (i64::from(wave) - 1);
    slowdown.max(8) as u32
}

/// Space Invaders with its balance values
#[derive(Debug, Clone, Default)]
pub struct Invaders {
    pub tuning: InvadersTuning,
}

/// Everything one Space Invaders run owns
#[derive(Debug, Clone, Serialize)]
pub struct InvadersState {
    pub world: World,
    /// Entity index of the ship
    pub ship: usize,
    /// Formation heading, +1 right or -1 left
    pub dir: f32,
    pub march_timer: u32,
    pub fire_timer: u32,
    /// Steps between enemy shots on this wave
    pub fire_interval: u32,
    /// Tick of the last player shot
    pub last_shot: Option<u64>,
    /// Remaining immunity steps after a hit
    pub invincible: u32,
}

impl InvadersState {
    pub fn invaders_alive(&self) -> usize {
        self.world
            .entities
            .iter()
            .filter(|e| e.alive && is_invader(e))
            .count()
    }

    fn live(&self, pred: impl Fn(&Entity) -> bool) -> Vec<usize> {
        (0..self.world.entities.len())
            .filter(|&i| {
                let e = &self.world.entities[i];
                e.alive && pred(e)
            })
            .collect()
    }
}

fn spawn_formation(world: &mut World, top: f32) {
    for row in 0..ROWS {
        for col in 0..COLS {
            let x = GRID_LEFT + col as f32 * (INVADER_W + INVADER_PAD_X);
            let y = top + row as f32 * (INVADER_H + INVADER_PAD_Y);
            world.spawn(
                EntityKind::Brick {
                    hp: 1,
                    points: (ROWS - row) as u32 * 10,
                    color: Color::MAGENTA,
                },
                Vec2::new(x + INVADER_W * 0.5, y + INVADER_H * 0.5),
                Shape::rect(INVADER_W, INVADER_H),
            );
        }
    }
}

fn spawn_shields(world: &mut World) {
    for sx in SHIELD_X {
        for bx in 0..4 {
            for by in 0..2 {
                let x = sx + bx as f32 * (SHIELD_BLOCK + 1.0);
                let y = HEIGHT - 90.0 + by as f32 * (SHIELD_BLOCK + 1.0);
                world.spawn(
                    EntityKind::Brick {
                        hp: SHIELD_HP,
                        points: 0,
                        color: Color::CYAN,
                    },
                    Vec2::new(x + SHIELD_BLOCK * 0.5, y + SHIELD_BLOCK * 0.5),
                    Shape::rect(SHIELD_BLOCK, SHIELD_BLOCK),
                );
            }
        }
    }
}

impl Invaders {
    pub fn new(tuning: InvadersTuning) -> Self {
        Self { tuning }
    }

    /// Keys take precedence; a pointer or touch puts the ship under it
    fn move_ship(&self, state: &mut InvadersState, input: &InputSnapshot) {
        let ship = &mut state.world.entities[state.ship];
        let keys = input.held.contains(Control::Left) || input.held.contains(Control::Right);

        if keys {
            ship.pos.x += input.held.axis(Control::Left, Control::Right) * self.tuning.ship_speed;
        } else if let Some(pointer) = input.pointer {
            ship.pos.x = pointer.x;
        }
        ship.pos.x = ship.pos.x.clamp(SHIP_W * 0.5, WIDTH - SHIP_W * 0.5);
    }

    fn fire(&self, state: &mut InvadersState) {
        let now = state.world.time_ticks;
        if let Some(last) = state.last_shot {
            if now.saturating_sub(last) <= u64::from(self.tuning.shot_cooldown) {
                return;
            }
        }
        state.last_shot = Some(now);

        let ship = state.world.entities[state.ship].bounds();
        let muzzle = Vec2::new(ship.center().x, ship.min.y - SHOT_H * 0.5);
        let shot = state.world.spawn(
            EntityKind::Projectile { team: Team::Player },
            muzzle,
            Shape::rect(SHOT_W, SHOT_H),
        );
        state.world.entities[shot].vel = Vec2::new(0.0, -self.tuning.shot_speed);
        state.world.emit(GameEvent::Fired { team: Team::Player });
    }

    fn resolve_player_shots(&self, state: &mut InvadersState) {
        for shot in state.live(|e| is_shot(e, Team::Player)) {
            if state.world.entities[shot].bounds().max.y < 0.0 {
                state.world.entities[shot].alive = false;
                continue;
            }
            if let Some(impact) = resolve_targets(&mut state.world, shot, DEBRIS) {
                state.world.entities[shot].alive = false;
                state.world.emit(GameEvent::TargetHit {
                    points: impact.points,
                    destroyed: impact.destroyed,
                });
            }
        }
    }

    fn march(&self, state: &mut InvadersState) {
        let formation = state.live(is_invader);
        if formation.is_empty() {
            return;
        }
        state.march_timer += 1;
        if state.march_timer < march_interval(formation.len(), state.world.progress.level) {
            return;
        }
        state.march_timer = 0;

        let dx = state.dir * (4.0 + state.world.progress.level as f32 * 0.5);
        let mut left = f32::MAX;
        let mut right = f32::MIN;
        for &i in &formation {
            let inv = &mut state.world.entities[i];
            inv.pos.x += dx;
            let b = inv.bounds();
            left = left.min(b.min.x);
            right = right.max(b.max.x);
        }

        if right >= WIDTH - EDGE || left <= EDGE {
            state.dir = -state.dir;
            for &i in &formation {
                state.world.entities[i].pos.y += DROP;
            }
        }
    }

    fn enemy_fire(&self, state: &mut InvadersState) {
        state.fire_timer += 1;
        if state.fire_timer < state.fire_interval {
            return;
        }
        let formation = state.live(is_invader);
        if formation.is_empty() {
            return;
        }
        state.fire_timer = 0;

        let pick = state.world.rng().random_range(0..formation.len());
        let shooter = state.world.entities[formation[pick]].bounds();
        let shot = state.world.spawn(
            EntityKind::Projectile {
                team: Team::Opponent,
            },
            Vec2::new(shooter.center().x, shooter.max.y + SHOT_H * 0.5),
            Shape::rect(SHOT_W, SHOT_H),
        );
        state.world.entities[shot].vel = Vec2::new(0.0, self.tuning.enemy_shot_speed);
        state.world.emit(GameEvent::Fired {
            team: Team::Opponent,
        });
    }

    fn resolve_enemy_shots(&self, state: &mut InvadersState) {
        let ship = state.world.entities[state.ship].bounds();
        for shot in state.live(|e| is_shot(e, Team::Opponent)) {
            if state.world.entities[shot].bounds().min.y > HEIGHT {
                state.world.entities[shot].alive = false;
                continue;
            }
            if resolve_targets_where(&mut state.world, shot, 0, is_shield).is_some() {
                state.world.entities[shot].alive = false;
                continue;
            }
            if state.invincible == 0 && state.world.entities[shot].bounds().overlaps(&ship) {
                state.world.entities[shot].alive = false;
                self.ship_hit(state);
            }
        }
    }

    fn ship_hit(&self, state: &mut InvadersState) {
        let out = state.world.progress.lose_life();
        let remaining = state.world.progress.lives;
        state.world.emit(GameEvent::LifeLost { remaining });
        state.invincible = self.tuning.invincible_ticks;
        if out {
            state.world.end_run(false);
        }
    }

    fn landed(state: &InvadersState) -> bool {
        state
            .world
            .entities
            .iter()
            .any(|e| e.alive && is_invader(e) && e.bounds().max.y >= GROUND)
    }

    fn clear_wave(&self, state: &mut InvadersState) {
        state.world.progress.next_level();
        state.fire_interval = state
            .fire_interval
            .saturating_sub(self.tuning.fire_interval_step)
            .max(self.tuning.min_fire_interval);
        if state.world.transition(Trigger::WaveCleared) {
            let level = state.world.progress.level;
            state.world.emit(GameEvent::WaveCleared { level });
        }
    }
}

impl Game for Invaders {
    type State = InvadersState;

    fn id(&self) -> &'static str {
        ID
    }

    fn title(&self) -> &'static str {
        "SPACE INVADERS"
    }

    fn instructions(&self) -> &'static [&'static str] {
        &["Arrows or mouse move the ship", "Click or Space fires"]
    }

    fn size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn fresh_state(&self, seed: u64) -> InvadersState {
        let mut world = World::new(seed, self.tuning.lives);
        let ship = world.spawn(
            EntityKind::Paddle { team: Team::Player },
            Vec2::new(WIDTH * 0.5, GROUND - SHIP_H * 0.5),
            Shape::rect(SHIP_W, SHIP_H),
        );
        spawn_shields(&mut world);
        spawn_formation(&mut world, GRID_TOP);

        InvadersState {
            world,
            ship,
            dir: 1.0,
            march_timer: 0,
            fire_timer: 0,
            fire_interval: self.tuning.fire_interval,
            last_shot: None,
            invincible: 0,
        }
    }

    fn world<'a>(&self, state: &'a InvadersState) -> &'a World {
        &state.world
    }

    fn world_mut<'a>(&self, state: &'a mut InvadersState) -> &'a mut World {
        &mut state.world
    }

    /// Next wave: a fresh formation a little lower, no shots in flight.
    /// Shields keep their damage.
    fn on_continue(&self, state: &mut InvadersState) {
        state
            .world
            .remove_where(|e| is_invader(e) || matches!(e.kind, EntityKind::Projectile { .. }));
        spawn_formation(&mut state.world, GRID_TOP + WAVE_OFFSET);
        state.dir = 1.0;
        state.march_timer = 0;
        state.fire_timer = 0;
    }

    fn step(&self, state: &mut InvadersState, input: &InputSnapshot) {
        self.move_ship(state, input);
        if !input.commands.is_empty() {
            self.fire(state);
        }

        integrate(&mut state.world.entities);
        self.resolve_player_shots(state);
        self.march(state);

        if Self::landed(state) {
            state.world.end_run(false);
            return;
        }
        if state.invaders_alive() == 0 {
            self.clear_wave(state);
            update_particles(&mut state.world.entities);
            return;
        }

        self.enemy_fire(state);
        self.resolve_enemy_shots(state);
        state.invincible = state.invincible.saturating_sub(1);

        state
            .world
            .remove_where(|e| matches!(e.kind, EntityKind::Projectile { .. }) && !e.alive);
        update_particles(&mut state.world.entities);
    }

    fn draw(&self, state: &InvadersState, frame: &mut Frame) {
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
                format!("WAVE: {}", world.progress.level),
                Vec2::new(WIDTH - 10.0, 22.0),
                13.0,
                Align::Right,
                Color::CYAN,
            );
            for i in 0..world.progress.lives {
                let x = WIDTH * 0.5 - 30.0 + f32::from(i) * 26.0;
                frame.rounded_rect(Aabb::from_corner(x, 8.0, 18.0, 10.0), Color::CYAN, 2.0, 6.0);
            }
        }

        for entity in world.entities.iter().filter(|e| e.alive) {
            match entity.kind {
                EntityKind::Brick { hp, points: 0, .. } => {
                    let alpha = (f32::from(hp) / f32::from(SHIELD_HP) * 0.8 * 255.0) as u8;
                    frame.rect(entity.bounds(), Color::CYAN.with_alpha(alpha), 0.0);
                }
                EntityKind::Brick { .. } => {
                    draw_entity(frame, entity);
                    // Eyes
                    let b = entity.bounds();
                    for ex in [b.min.x + 9.0, b.max.x - 15.0] {
                        let eye = Aabb::from_corner(ex, b.min.y + 9.0, 6.0, 6.0);
                        frame.rect(eye, Color::BACKGROUND, 0.0);
                    }
                }
                EntityKind::Projectile { .. } | EntityKind::Particle { .. } => {
                    draw_entity(frame, entity)
                }
                _ => {}
            }
        }

        // Blink while immune
        if state.invincible == 0 || world.time_ticks % 6 >= 3 {
            let ship = &world.entities[state.ship];
            draw_entity(frame, ship);
            let b = ship.bounds();
            frame.rect(
                Aabb::from_corner(b.center().x - 3.0, b.min.y - 6.0, 6.0, 6.0),
                Color::CYAN,
                8.0,
            );
        }

        frame.rect(Aabb::from_corner(0.0, GROUND, WIDTH, 1.0), Color::DIM, 0.0);
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
    use crate::sim::{Command, Phase};

    fn engine(tuning: InvadersTuning) -> (Engine<Invaders>, Rc<RefCell<RecordingSink>>) {
        let sink = Rc::new(RefCell::new(RecordingSink::default()));
        let engine = Engine::new(
            Invaders::new(tuning),
            5,
            Box::new(MemoryStore::new()),
            Box::new(sink.clone()),
        );
        (engine, sink)
    }

    fn press(engine: &mut Engine<Invaders>) {
        Runtime::input(engine).press(None);
        engine.step();
    }

    fn shot(state: &mut InvadersState, team: Team, pos: Vec2) -> usize {
        state.world.spawn(
            EntityKind::Projectile { team },
            pos,
            Shape::rect(SHOT_W, SHOT_H),
        )
    }

    fn shots(state: &InvadersState) -> usize {
        state
            .world
            .entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Projectile { .. }))
            .count()
    }

    fn fire_input() -> InputSnapshot {
        InputSnapshot::with_commands(vec![Command::Primary { at: None }])
    }

    #[test]
    fn test_fresh_layout() {
        let state = Invaders::default().fresh_state(1);
        assert_eq!(state.invaders_alive(), ROWS * COLS);
        let shields: Vec<_> = state.world.entities.iter().filter(|e| is_shield(e)).collect();
        assert_eq!(shields.len(), 32);
        assert!(shields.iter().all(|e| matches!(e.kind, EntityKind::Brick { hp: 3, .. })));
        assert_eq!(state.world.progress.lives, 3);

        let ship = state.world.entities[state.ship].bounds();
        assert_eq!(ship.max.y, GROUND);
        assert_eq!(ship.center().x, WIDTH * 0.5);
    }

    #[test]
    fn test_march_interval() {
        assert_eq!(march_interval(32, 1), 8);
        assert_eq!(march_interval(10, 1), 30);
        assert_eq!(march_interval(10, 3), 20);
        assert_eq!(march_interval(1, 1), 48);
    }

    #[test]
    fn test_shot_cooldown() {
        let game = Invaders::default();
        let mut state = game.fresh_state(1);
        // A lane with no shield above it
        state.world.entities[state.ship].pos.x = 48.0;
        game.step(&mut state, &fire_input());
        game.step(&mut state, &fire_input());
        assert_eq!(shots(&state), 1);

        state.world.time_ticks = 21;
        game.step(&mut state, &fire_input());
        assert_eq!(shots(&state), 2);

        let first = state.world.entities.iter().find(|e| is_shot(e, Team::Player)).unwrap();
        assert_eq!(first.vel, Vec2::new(0.0, -8.0));
    }

    #[test]
    fn test_player_shot_destroys_invader() {
        let game = Invaders::default();
        let mut state = game.fresh_state(1);
        let target = state.world.entities.iter().position(is_invader).unwrap();
        let pos = state.world.entities[target].pos;
        shot(&mut state, Team::Player, pos + Vec2::new(0.0, 8.0));

        game.step(&mut state, &InputSnapshot::default());
        assert!(!state.world.entities[target].alive);
        // Top row is worth the most
        assert_eq!(state.world.progress.score, 40);
        assert_eq!(shots(&state), 0);
    }

    #[test]
    fn test_enemy_shots_ignore_invaders_and_chip_shields() {
        let game = Invaders::default();
        let mut state = game.fresh_state(1);
        let inv = state.world.entities.iter().position(is_invader).unwrap();
        let inv_pos = state.world.entities[inv].pos;
        shot(&mut state, Team::Opponent, inv_pos - Vec2::new(0.0, 3.0));
        game.step(&mut state, &InputSnapshot::default());
        assert!(state.world.entities[inv].alive);
        assert_eq!(shots(&state), 1);

        let block = state.world.entities.iter().position(is_shield).unwrap();
        let block_pos = state.world.entities[block].pos;
        shot(&mut state, Team::Opponent, block_pos - Vec2::new(0.0, 3.0));
        game.step(&mut state, &InputSnapshot::default());
        assert!(matches!(
            state.world.entities[block].kind,
            EntityKind::Brick { hp: 2, .. }
        ));
        assert_eq!(state.world.progress.score, 0);
    }

    #[test]
    fn test_hit_grants_immunity() {
        let game = Invaders::default();
        let mut state = game.fresh_state(1);
        let ship_pos = state.world.entities[state.ship].pos;
        shot(&mut state, Team::Opponent, ship_pos);
        game.step(&mut state, &InputSnapshot::default());
        assert_eq!(state.world.progress.lives, 2);
        assert_eq!(state.invincible, 119);

        shot(&mut state, Team::Opponent, ship_pos);
        game.step(&mut state, &InputSnapshot::default());
        assert_eq!(state.world.progress.lives, 2);
    }

    #[test]
    fn test_last_life_ends_run_once() {
        let (mut engine, sink) = engine(InvadersTuning {
            lives: 1,
            ..Default::default()
        });
        press(&mut engine);
        assert_eq!(engine.world().phase, Phase::Playing);

        let state = engine.state_mut();
        let ship_pos = state.world.entities[state.ship].pos;
        shot(state, Team::Opponent, ship_pos);
        shot(state, Team::Opponent, ship_pos);
        engine.step();

        assert_eq!(engine.world().phase, Phase::Over);
        assert_eq!(engine.world().progress.lives, 0);
        assert_eq!(sink.borrow().scores.len(), 1);
    }

    #[test]
    fn test_landing_ends_run() {
        let (mut engine, sink) = engine(InvadersTuning::default());
        press(&mut engine);
        for e in engine.state_mut().world.entities.iter_mut().filter(|e| is_invader(e)) {
            e.pos.y += 300.0;
        }
        engine.step();
        assert_eq!(engine.world().phase, Phase::Over);
        assert_eq!(engine.world().progress.lives, 3);
        assert_eq!(sink.borrow().scores.len(), 1);
    }

    #[test]
    fn test_formation_turns_and_drops_at_edge() {
        let game = Invaders::default();
        let mut state = game.fresh_state(1);
        let first = state.world.entities.iter().position(is_invader).unwrap();
        let start_y = state.world.entities[first].pos.y;

        for _ in 0..100 {
            game.step(&mut state, &InputSnapshot::default());
            if state.dir < 0.0 {
                break;
            }
        }
        assert_eq!(state.dir, -1.0);
        assert_eq!(state.world.entities[first].pos.y, start_y + DROP);
    }

    #[test]
    fn test_wave_clear_and_continue() {
        let (mut engine, _) = engine(InvadersTuning::default());
        press(&mut engine);
        {
            let state = engine.state_mut();
            for e in state.world.entities.iter_mut().filter(|e| is_invader(e)) {
                e.alive = false;
            }
            let ship_pos = state.world.entities[state.ship].pos;
            shot(state, Team::Player, ship_pos - Vec2::new(0.0, 100.0));
            state.world.entities[1].kind = EntityKind::Brick {
                hp: 1,
                points: 0,
                color: Color::CYAN,
            };
        }
        engine.step();
        assert_eq!(engine.world().phase, Phase::LevelUp);
        assert_eq!(engine.world().progress.level, 2);
        assert_eq!(engine.state().fire_interval, 105);

        press(&mut engine);
        let state = engine.state();
        assert_eq!(engine.world().phase, Phase::Playing);
        assert_eq!(state.invaders_alive(), ROWS * COLS);
        assert_eq!(shots(state), 0);
        // Shield damage carries over
        assert!(matches!(
            state.world.entities[1].kind,
            EntityKind::Brick { hp: 1, points: 0, .. }
        ));
        let top = state
            .world
            .entities
            .iter()
            .filter(|e| is_invader(e))
            .map(|e| e.bounds().min.y)
            .fold(f32::MAX, f32::min);
        assert_eq!(top, GRID_TOP + WAVE_OFFSET);
    }

    #[test]
    fn test_draw_does_not_mutate() {
        let (mut engine, _) = engine(InvadersTuning::default());
        press(&mut engine);
        let before = serde_json::to_string(engine.state()).unwrap();
        let frame = engine.render();
        assert!(frame.texts().any(|t| t == "WAVE: 1"));
        assert_eq!(serde_json::to_string(engine.state()).unwrap(), before);
    }
}
