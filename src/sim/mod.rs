//! Deterministic simulation module
//!
//! All gameplay mechanics shared by the games live here. This module must be
//! pure and deterministic:
//! - One step per frame, no wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (entity spawn order)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod collision;
pub mod entity;
pub mod event;
pub mod input;
pub mod motion;
pub mod phase;
pub mod progress;
pub mod world;

pub use aabb::Aabb;
pub use collision::{
    Facing, Impact, PaddleRule, Side, contact, paddle_catches, paddle_rebound, resolve_targets,
    resolve_targets_where,
};
pub use entity::{Entity, EntityKind, Shape, Team};
pub use event::GameEvent;
pub use input::{Command, Control, ControlSet, InputSampler, InputSnapshot};
pub use motion::{
    BoundaryHit, Bounds, Walls, escaped, integrate, reflect_in_bounds, update_particles,
};
pub use phase::{Phase, Trigger};
pub use progress::Progress;
pub use world::World;
