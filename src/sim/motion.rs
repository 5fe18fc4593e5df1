//! Motion integration and world boundary reflection
//!
//! One step is one frame: `pos += vel`, no dt scaling. Velocities are
//! bounded per game so plain Euler is enough.

use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::entity::{Entity, EntityKind};
use crate::consts::PARTICLE_GRAVITY;

/// Which world edges reflect moving entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walls {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Walls {
    pub const ALL: Walls = Walls {
        left: true,
        right: true,
        top: true,
        bottom: true,
    };
    /// Breakout: the floor is open
    pub const OPEN_BOTTOM: Walls = Walls {
        bottom: false,
        ..Walls::ALL
    };
    /// Pong: the goal lines are open
    pub const OPEN_SIDES: Walls = Walls {
        left: false,
        right: false,
        ..Walls::ALL
    };
}

/// Rectangular play field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub area: Aabb,
    pub walls: Walls,
}

impl Bounds {
    pub fn new(width: f32, height: f32, walls: Walls) -> Self {
        Self {
            area: Aabb::from_corner(0.0, 0.0, width, height),
            walls,
        }
    }
}

/// Which velocity components were flipped by a boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundaryHit {
    pub x: bool,
    pub y: bool,
}

impl BoundaryHit {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Advance every moving entity by its velocity
pub fn integrate(entities: &mut [Entity]) {
    for entity in entities.iter_mut().filter(|e| e.is_moving()) {
        entity.pos += entity.vel;
    }
}

/// Clamp an entity inside the reflecting walls and point its velocity back
/// inward. Axes are handled independently, so a corner flips both. Only a
/// velocity that actually flipped counts as a hit.
pub fn reflect_in_bounds(entity: &mut Entity, bounds: &Bounds) -> BoundaryHit {
    let half = entity.shape.half_extents();
    let area = bounds.area;
    let walls = bounds.walls;
    let mut hit = BoundaryHit::default();

    if walls.left && entity.pos.x - half.x <= area.min.x {
        entity.pos.x = area.min.x + half.x;
        hit.x = entity.vel.x < 0.0;
        entity.vel.x = entity.vel.x.abs();
    } else if walls.right && entity.pos.x + half.x >= area.max.x {
        entity.pos.x = area.max.x - half.x;
        hit.x = entity.vel.x > 0.0;
        entity.vel.x = -entity.vel.x.abs();
    }

    if walls.top && entity.pos.y - half.y <= area.min.y {
        entity.pos.y = area.min.y + half.y;
        hit.y = entity.vel.y < 0.0;
        entity.vel.y = entity.vel.y.abs();
    } else if walls.bottom && entity.pos.y + half.y >= area.max.y {
        entity.pos.y = area.max.y - half.y;
        hit.y = entity.vel.y > 0.0;
        entity.vel.y = -entity.vel.y.abs();
    }

    hit
}

/// Whether an entity has fully left the field through a non-reflecting edge
pub fn escaped(entity: &Entity, bounds: &Bounds) -> bool {
    let b = entity.bounds();
    let area = bounds.area;
    (!bounds.walls.bottom && b.min.y > area.max.y)
        || (!bounds.walls.top && b.max.y < area.min.y)
        || (!bounds.walls.left && b.max.x < area.min.x)
        || (!bounds.walls.right && b.min.x > area.max.x)
}

/// Age particles: gravity, fade, and drop the ones that burned out
pub fn update_particles(entities: &mut Vec<Entity>) {
    for entity in entities.iter_mut() {
        if let EntityKind::Particle { life, decay, .. } = &mut entity.kind {
            entity.vel.y += PARTICLE_GRAVITY;
            *life -= *decay;
            if *life <= 0.0 {
                entity.alive = false;
            }
        }
    }
    entities.retain(|e| !(e.is_particle() && !e.alive));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Shape;
    use crate::Color;
    use glam::Vec2;
    use proptest::prelude::*;

    fn ball(pos: Vec2, vel: Vec2) -> Entity {
        let mut e = Entity::new(
            1,
            EntityKind::Ball { attached: false },
            pos,
            Shape::Circle { radius: 7.0 },
        );
        e.vel = vel;
        e
    }

    #[test]
    fn test_corner_reflects_both_axes() {
        let bounds = Bounds::new(400.0, 500.0, Walls::ALL);
        let mut e = ball(Vec2::new(7.0, 7.0), Vec2::new(-3.0, -4.0));
        integrate(std::slice::from_mut(&mut e));
        let hit = reflect_in_bounds(&mut e, &bounds);
        assert!(hit.x && hit.y);
        assert_eq!(e.pos, Vec2::new(7.0, 7.0));
        assert_eq!(e.vel, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_resting_on_wall_moving_inward_is_not_a_hit() {
        let bounds = Bounds::new(400.0, 500.0, Walls::ALL);
        let mut e = ball(Vec2::new(7.0, 250.0), Vec2::new(3.0, 0.0));
        let hit = reflect_in_bounds(&mut e, &bounds);
        assert!(!hit.any());
        assert_eq!(e.vel, Vec2::new(3.0, 0.0));

        // Same spot moving outward does count
        let mut e = ball(Vec2::new(7.0, 250.0), Vec2::new(-3.0, 0.0));
        assert!(reflect_in_bounds(&mut e, &bounds).x);
        assert_eq!(e.vel.x, 3.0);
    }

    #[test]
    fn test_open_floor_lets_ball_escape() {
        let bounds = Bounds::new(400.0, 500.0, Walls::OPEN_BOTTOM);
        let mut e = ball(Vec2::new(200.0, 505.0), Vec2::new(0.0, 4.0));
        integrate(std::slice::from_mut(&mut e));
        assert!(!reflect_in_bounds(&mut e, &bounds).any());
        assert!(e.vel.y > 0.0);
        assert!(escaped(&e, &bounds));
    }

    #[test]
    fn test_particles_fade_out() {
        let mut entities = vec![Entity::new(
            1,
            EntityKind::Particle {
                life: 0.1,
                decay: 0.06,
                color: Color::WHITE,
            },
            Vec2::ZERO,
            Shape::Circle { radius: 2.0 },
        )];
        update_particles(&mut entities);
        assert_eq!(entities.len(), 1);
        assert!((entities[0].vel.y - PARTICLE_GRAVITY).abs() < 1e-6);
        update_particles(&mut entities);
        assert!(entities.is_empty());
    }

    proptest! {
        #[test]
        fn prop_boundary_reflection_points_inward(
            speed_x in 0.1f32..12.0,
            speed_y in 0.1f32..12.0,
            side in 0usize..4,
        ) {
            let bounds = Bounds::new(400.0, 500.0, Walls::ALL);
            // Sit exactly on the boundary, moving outward
            let (pos, vel) = match side {
                0 => (Vec2::new(7.0, 250.0), Vec2::new(-speed_x, speed_y)),
                1 => (Vec2::new(393.0, 250.0), Vec2::new(speed_x, speed_y)),
                2 => (Vec2::new(200.0, 7.0), Vec2::new(speed_x, -speed_y)),
                _ => (Vec2::new(200.0, 493.0), Vec2::new(speed_x, speed_y)),
            };
            let mut e = ball(pos, vel);
            integrate(std::slice::from_mut(&mut e));
            let hit = reflect_in_bounds(&mut e, &bounds);
            prop_assert!(hit.any());

            match side {
                0 => { prop_assert!(e.vel.x > 0.0); prop_assert_eq!(e.pos.x, 7.0); }
                1 => { prop_assert!(e.vel.x < 0.0); prop_assert_eq!(e.pos.x, 393.0); }
                2 => { prop_assert!(e.vel.y > 0.0); prop_assert_eq!(e.pos.y, 7.0); }
                _ => { prop_assert!(e.vel.y < 0.0); prop_assert_eq!(e.pos.y, 493.0); }
            }
            prop_assert!(e.bounds().min.x >= 0.0 && e.bounds().max.x <= 400.0);
            prop_assert!(e.bounds().min.y >= 0.0 && e.bounds().max.y <= 500.0);
        }
    }
}
