//! Rendering module
//!
//! Games paint into a `Frame` (pure, testable); a `Surface` replays it.
//! In the browser that surface is a Canvas 2D context.

pub mod frame;
#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use frame::{Align, DrawCmd, Frame, Surface};
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use crate::Color;
use crate::sim::{Entity, EntityKind, Shape, Team};

/// Paddle color by side
pub fn team_color(team: Team) -> Color {
    match team {
        Team::Player => Color::CYAN,
        Team::Opponent => Color::MAGENTA,
    }
}

/// Paint one live entity according to its kind
pub fn draw_entity(frame: &mut Frame, entity: &Entity) {
    if !entity.alive {
        return;
    }

    match entity.kind {
        EntityKind::Ball { .. } => {
            if let Shape::Circle { radius } = entity.shape {
                frame.circle(entity.pos, radius, Color::WHITE, 16.0);
            }
        }
        EntityKind::Paddle { team } => {
            frame.rounded_rect(entity.bounds(), team_color(team), 4.0, 14.0);
        }
        EntityKind::Brick { color, .. } => {
            frame.rounded_rect(entity.bounds(), color, 3.0, 8.0);
        }
        EntityKind::Projectile { team } => {
            frame.rect(entity.bounds(), team_color(team), 10.0);
        }
        EntityKind::Particle { life, color, .. } => {
            let radius = entity.shape.half_extents().x * life.clamp(0.0, 1.0);
            let alpha = (life.clamp(0.0, 1.0) * 255.0) as u8;
            frame.circle(entity.pos, radius, color.with_alpha(alpha), 0.0);
        }
    }
}

/// Paint entities in spawn order
pub fn draw_entities(frame: &mut Frame, entities: &[Entity]) {
    for entity in entities {
        draw_entity(frame, entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use glam::Vec2;

    #[test]
    fn test_dead_entities_not_drawn() {
        let mut frame = Frame::new(Vec2::new(100.0, 100.0), &Settings::default());
        let mut brick = Entity::new(
            1,
            EntityKind::Brick {
                hp: 1,
                points: 10,
                color: Color::CYAN,
            },
            Vec2::new(50.0, 50.0),
            Shape::rect(42.0, 16.0),
        );
        draw_entities(&mut frame, &[brick]);
        assert_eq!(frame.cmds.len(), 1);

        brick.alive = false;
        let mut frame = Frame::new(Vec2::new(100.0, 100.0), &Settings::default());
        draw_entities(&mut frame, &[brick]);
        assert!(frame.cmds.is_empty());
    }

    #[test]
    fn test_particle_fades_with_life() {
        let mut frame = Frame::new(Vec2::new(100.0, 100.0), &Settings::default());
        let particle = Entity::new(
            1,
            EntityKind::Particle {
                life: 0.5,
                decay: 0.05,
                color: Color::MAGENTA,
            },
            Vec2::ZERO,
            Shape::Circle { radius: 4.0 },
        );
        draw_entity(&mut frame, &particle);
        match &frame.cmds[0] {
            DrawCmd::Circle { radius, color, .. } => {
                assert_eq!(*radius, 2.0);
                assert_eq!(color.a, 127);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
