//! Collision detection and response
//!
//! Two rules live here:
//! - Target hits (bricks and other solids): axis-aligned overlap, reflect on the
//!   side with the least penetration, then damage/score the target.
//! - Paddle hits: the rebound angle depends on where the ball lands relative to
//!   the paddle center, not on mirror reflection.

use glam::Vec2;

use super::aabb::Aabb;
use super::entity::{Entity, EntityKind};
use super::world::World;

/// Side of the static entity that was struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

/// Result of an overlap test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub side: Side,
    /// Penetration depth on that side
    pub depth: f32,
}

/// Minimum-penetration contact between a moving box and a static box.
///
/// Exact ties go to the vertical (top/bottom) sides, top before bottom and
/// left before right.
pub fn contact(moving: &Aabb, fixed: &Aabb) -> Option<Contact> {
    if !moving.overlaps(fixed) {
        return None;
    }

    let left = moving.max.x - fixed.min.x;
    let right = fixed.max.x - moving.min.x;
    let top = moving.max.y - fixed.min.y;
    let bottom = fixed.max.y - moving.min.y;

    let vertical = if top <= bottom {
        (Side::Top, top)
    } else {
        (Side::Bottom, bottom)
    };
    let horizontal = if left <= right {
        (Side::Left, left)
    } else {
        (Side::Right, right)
    };
    let (side, depth) = if vertical.1 <= horizontal.1 {
        vertical
    } else {
        horizontal
    };

    Some(Contact { side, depth })
}

/// Flip the velocity component orthogonal to the struck side
#[inline]
pub fn reflect(vel: Vec2, side: Side) -> Vec2 {
    if side.is_vertical() {
        Vec2::new(vel.x, -vel.y)
    } else {
        Vec2::new(-vel.x, vel.y)
    }
}

/// A resolved hit against a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    /// Index of the struck entity in the world's entity list
    pub target: usize,
    pub side: Side,
    pub destroyed: bool,
    pub points: u32,
}

/// Find the single target the mover should bounce off this step.
///
/// Only live bricks that pass `accept` are candidates. Among all overlaps the
/// smallest penetration wins; equal depths keep the earliest entity.
pub fn find_target(
    entities: &[Entity],
    mover: usize,
    accept: impl Fn(&Entity) -> bool,
) -> Option<(usize, Contact)> {
    let moving = entities[mover].bounds();
    let mut best: Option<(usize, Contact)> = None;

    for (idx, entity) in entities.iter().enumerate() {
        if idx == mover || !entity.alive || !entity.is_brick() || !accept(entity) {
            continue;
        }
        if let Some(c) = contact(&moving, &entity.bounds()) {
            let better = match best {
                Some((_, b)) => c.depth < b.depth,
                None => true,
            };
            if better {
                best = Some((idx, c));
            }
        }
    }

    best
}

/// Resolve at most one target hit for the mover: reflect, damage, score and
/// spawn debris for destroyed targets.
pub fn resolve_targets(world: &mut World, mover: usize, debris: usize) -> Option<Impact> {
    resolve_targets_where(world, mover, debris, |_| true)
}

/// `resolve_targets` restricted to the bricks `accept` lets through, e.g.
/// enemy shots that pass through their own ranks
pub fn resolve_targets_where(
    world: &mut World,
    mover: usize,
    debris: usize,
    accept: impl Fn(&Entity) -> bool,
) -> Option<Impact> {
    if !world.entities[mover].alive {
        return None;
    }
    let (target, contact) = find_target(&world.entities, mover, accept)?;

    let vel = world.entities[mover].vel;
    world.entities[mover].vel = reflect(vel, contact.side);

    let entity = &mut world.entities[target];
    let mut impact = Impact {
        target,
        side: contact.side,
        destroyed: false,
        points: 0,
    };
    let mut burst = None;

    if let EntityKind::Brick { hp, points, color } = &mut entity.kind {
        *hp = hp.saturating_sub(1);
        if *hp == 0 {
            entity.alive = false;
            impact.destroyed = true;
            impact.points = *points;
            burst = Some((entity.pos, *color));
        }
    }

    if impact.destroyed {
        world.progress.award(impact.points);
    }
    if let Some((pos, color)) = burst {
        world.spawn_burst(pos, color, debris);
    }

    Some(impact)
}

/// Which way a paddle's striking face points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    /// Unit normal of the striking face
    pub fn normal(self) -> Vec2 {
        match self {
            Facing::Up => Vec2::new(0.0, -1.0),
            Facing::Down => Vec2::new(0.0, 1.0),
            Facing::Left => Vec2::new(-1.0, 0.0),
            Facing::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// How a particular paddle catches and returns the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleRule {
    pub facing: Facing,
    /// Deflection at either paddle edge, radians
    pub max_angle: f32,
    /// Extra catch depth past the back of the paddle
    pub tolerance: f32,
    /// Gap left between the ball and the face after the rebound
    pub clearance: f32,
}

/// Map an impact offset to a rebound angle: 0 at the center, +-max at the edges
pub fn deflection_angle(offset: f32, half_span: f32, max_angle: f32) -> f32 {
    if half_span <= 0.0 {
        return 0.0;
    }
    (offset / half_span).clamp(-1.0, 1.0) * max_angle
}

/// Whether the ball is being caught by the paddle this step
pub fn paddle_catches(ball: &Entity, paddle: &Aabb, rule: &PaddleRule) -> bool {
    let b = ball.bounds();
    let normal = rule.facing.normal();
    if ball.vel.dot(normal) >= 0.0 {
        return false;
    }

    // depth: how far the ball's leading edge has passed the face
    let (depth, thickness) = match rule.facing {
        Facing::Up => (b.max.y - paddle.min.y, paddle.height()),
        Facing::Down => (paddle.max.y - b.min.y, paddle.height()),
        Facing::Left => (b.max.x - paddle.min.x, paddle.width()),
        Facing::Right => (paddle.max.x - b.min.x, paddle.width()),
    };
    let (along, span_min, span_max) = if matches!(rule.facing, Facing::Up | Facing::Down) {
        (ball.pos.x, paddle.min.x, paddle.max.x)
    } else {
        (ball.pos.y, paddle.min.y, paddle.max.y)
    };

    depth >= 0.0 && depth <= thickness + rule.tolerance && along >= span_min && along <= span_max
}

/// Send the ball back off the paddle at `speed`, angled by impact offset
pub fn paddle_rebound(ball: &mut Entity, paddle: &Aabb, rule: &PaddleRule, speed: f32) {
    let center = paddle.center();
    let half = ball.shape.half_extents();

    let angle = match rule.facing {
        Facing::Up | Facing::Down => {
            deflection_angle(ball.pos.x - center.x, paddle.width() * 0.5, rule.max_angle)
        }
        Facing::Left | Facing::Right => {
            deflection_angle(ball.pos.y - center.y, paddle.height() * 0.5, rule.max_angle)
        }
    };
    let (sin, cos) = angle.sin_cos();

    match rule.facing {
        Facing::Up => {
            ball.vel = Vec2::new(speed * sin, -speed * cos);
            ball.pos.y = paddle.min.y - half.y - rule.clearance;
        }
        Facing::Down => {
            ball.vel = Vec2::new(speed * sin, speed * cos);
            ball.pos.y = paddle.max.y + half.y + rule.clearance;
        }
        Facing::Left => {
            ball.vel = Vec2::new(-speed * cos, speed * sin);
            ball.pos.x = paddle.min.x - half.x - rule.clearance;
        }
        Facing::Right => {
            ball.vel = Vec2::new(speed * cos, speed * sin);
            ball.pos.x = paddle.max.x + half.x + rule.clearance;
        }
    }
}
