//! World state and core simulation types
//!
//! One `World` per running game instance. It is never reset in place: a restart
//! builds a brand new value.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::entity::{Entity, EntityKind, Shape};
use super::event::GameEvent;
use super::phase::{Phase, Trigger};
use super::progress::Progress;
use crate::Color;
use crate::consts::MAX_PARTICLES;

/// Shared state every game carries
#[derive(Debug, Clone, Serialize)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: Phase,
    /// All entities, in spawn order
    pub entities: Vec<Entity>,
    pub progress: Progress,
    /// Steps simulated while playing
    pub time_ticks: u64,
    /// Particle budget for this run
    pub particle_cap: usize,
    /// Events produced since the engine last drained them
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    #[serde(skip)]
    rng: Pcg32,
    next_id: u32,
}

impl World {
    pub fn new(seed: u64, lives: u8) -> Self {
        Self {
            seed,
            phase: Phase::Idle,
            entities: Vec::new(),
            progress: Progress::new(lives),
            time_ticks: 0,
            particle_cap: MAX_PARTICLES,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an entity and return its index
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec2, shape: Shape) -> usize {
        let id = self.next_entity_id();
        self.entities.push(Entity::new(id, kind, pos, shape));
        self.entities.len() - 1
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Uniform sample in `[lo, hi)` from the run's RNG
    pub fn random_range(&mut self, lo: f32, hi: f32) -> f32 {
        self.rng.random_range(lo..hi)
    }

    /// Scatter `count` debris particles from `pos`, up to the particle cap
    pub fn spawn_burst(&mut self, pos: Vec2, color: Color, count: usize) {
        let live = self.entities.iter().filter(|e| e.is_particle()).count();
        let room = self.particle_cap.min(MAX_PARTICLES).saturating_sub(live);

        for _ in 0..count.min(room) {
            let angle = self.rng.random_range(0.0..TAU);
            let speed = self.rng.random_range(1.5..4.5);
            let decay = self.rng.random_range(0.04..0.08);
            let radius = self.rng.random_range(2.0..4.0);
            let idx = self.spawn(
                EntityKind::Particle {
                    life: 1.0,
                    decay,
                    color,
                },
                pos,
                Shape::Circle { radius },
            );
            self.entities[idx].vel = Vec2::new(angle.cos(), angle.sin()) * speed;
        }
    }

    /// Apply a phase trigger. Returns false (and changes nothing) if illegal.
    pub fn transition(&mut self, trigger: Trigger) -> bool {
        match self.phase.on(trigger) {
            Some(next) => {
                log::info!("phase {} -> {} ({:?})", self.phase.as_str(), next.as_str(), trigger);
                self.phase = next;
                true
            }
            None => {
                log::debug!("ignored {:?} while {}", trigger, self.phase.as_str());
                false
            }
        }
    }

    /// End the run. Only the first call in a run moves to `Over` and emits
    /// `RunEnded`; later calls in the same or later steps are no-ops.
    pub fn end_run(&mut self, won: bool) -> bool {
        if !self.progress.end() {
            return false;
        }
        self.transition(Trigger::RunEnded);
        self.events.push(GameEvent::RunEnded {
            score: self.progress.score,
            won,
        });
        true
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Live bricks remaining
    pub fn bricks_alive(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.alive && e.is_brick())
            .count()
    }

    /// Drop every entity matching `pred`
    pub fn remove_where(&mut self, pred: impl Fn(&Entity) -> bool) {
        self.entities.retain(|e| !pred(e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut world = World::new(1, 3);
        let a = world.spawn(
            EntityKind::Ball { attached: true },
            Vec2::ZERO,
            Shape::Circle { radius: 7.0 },
        );
        let b = world.spawn(
            EntityKind::Ball { attached: true },
            Vec2::ZERO,
            Shape::Circle { radius: 7.0 },
        );
        assert_eq!(world.entities[a].id, 1);
        assert_eq!(world.entities[b].id, 2);
    }

    #[test]
    fn test_burst_respects_cap() {
        let mut world = World::new(1, 3);
        world.particle_cap = 15;
        world.spawn_burst(Vec2::ZERO, Color::WHITE, 10);
        world.spawn_burst(Vec2::ZERO, Color::WHITE, 10);
        assert_eq!(world.entities.len(), 15);
    }

    #[test]
    fn test_burst_is_deterministic() {
        let mut a = World::new(42, 3);
        let mut b = World::new(42, 3);
        a.spawn_burst(Vec2::ZERO, Color::WHITE, 10);
        b.spawn_burst(Vec2::ZERO, Color::WHITE, 10);
        assert_eq!(a.entities, b.entities);
    }

    #[test]
    fn test_end_run_emits_once() {
        let mut world = World::new(1, 3);
        world.transition(Trigger::Start);
        world.progress.award(120);
        assert!(world.end_run(false));
        assert!(!world.end_run(true));
        assert_eq!(world.phase, Phase::Over);
        let ends = world
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::RunEnded { .. }))
            .count();
        assert_eq!(ends, 1);
        assert_eq!(
            world.events[0],
            GameEvent::RunEnded {
                score: 120,
                won: false
            }
        );
    }

    #[test]
    fn test_illegal_transition_ignored() {
        let mut world = World::new(1, 3);
        assert!(!world.transition(Trigger::Continue));
        assert_eq!(world.phase, Phase::Idle);
    }
}
