//! Tagged entity records
//!
//! Every simulated object is one `Entity` whose `kind` says what it is, so
//! collision and rendering dispatch on the tag instead of guessing from shape.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::Color;

/// Collision/render footprint of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half: Vec2 },
}

impl Shape {
    pub fn rect(w: f32, h: f32) -> Self {
        Shape::Rect {
            half: Vec2::new(w * 0.5, h * 0.5),
        }
    }

    /// Half extents of the bounding box
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Rect { half } => half,
        }
    }
}

/// Which side a projectile belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Player,
    Opponent,
}

/// Entity variants and their payloads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Ball, optionally riding on the paddle until launched
    Ball { attached: bool },
    /// Player or opponent paddle
    Paddle { team: Team },
    /// Destructible target worth `points` once `hp` reaches zero
    Brick { hp: u8, points: u32, color: Color },
    /// Shots fired by either side
    Projectile { team: Team },
    /// Cosmetic debris, never collides
    Particle { life: f32, decay: f32, color: Color },
}

/// A simulated object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    /// Center position
    pub pos: Vec2,
    /// Displacement per step; zero for static entities
    pub vel: Vec2,
    pub shape: Shape,
    pub alive: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, shape: Shape) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            shape,
            alive: true,
            kind,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.shape.half_extents())
    }

    pub fn is_ball(&self) -> bool {
        matches!(self.kind, EntityKind::Ball { .. })
    }

    pub fn is_brick(&self) -> bool {
        matches!(self.kind, EntityKind::Brick { .. })
    }

    pub fn is_particle(&self) -> bool {
        matches!(self.kind, EntityKind::Particle { .. })
    }

    /// Whether the motion integrator should move it
    pub fn is_moving(&self) -> bool {
        self.alive
            && self.vel != Vec2::ZERO
            && !matches!(self.kind, EntityKind::Ball { attached: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_shape() {
        let ball = Entity::new(
            1,
            EntityKind::Ball { attached: false },
            Vec2::new(10.0, 10.0),
            Shape::Circle { radius: 7.0 },
        );
        assert_eq!(ball.bounds(), Aabb::from_corner(3.0, 3.0, 14.0, 14.0));

        let brick = Entity::new(
            2,
            EntityKind::Brick {
                hp: 1,
                points: 10,
                color: Color::CYAN,
            },
            Vec2::new(35.0, 68.0),
            Shape::rect(42.0, 16.0),
        );
        assert_eq!(brick.bounds().width(), 42.0);
        assert!(brick.is_brick());
    }

    #[test]
    fn test_attached_ball_does_not_move() {
        let mut ball = Entity::new(
            1,
            EntityKind::Ball { attached: true },
            Vec2::ZERO,
            Shape::Circle { radius: 7.0 },
        );
        ball.vel = Vec2::new(1.0, -1.0);
        assert!(!ball.is_moving());
        ball.kind = EntityKind::Ball { attached: false };
        assert!(ball.is_moving());
    }
}
