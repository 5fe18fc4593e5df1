//! Axis-aligned box geometry for paddles, bricks and balls
//!
//! All coordinates are logical canvas units with y growing downward:
//! - min: top-left corner
//! - max: bottom-right corner

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box from a top-left corner and a size
    pub fn from_corner(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(x + w, y + h))
    }

    /// Box from a center point and half extents
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self::new(center - half, center + half)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Strict overlap test: touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_strict() {
        let a = Aabb::from_corner(0.0, 0.0, 10.0, 10.0);
        let touching = Aabb::from_corner(10.0, 0.0, 10.0, 10.0);
        let crossing = Aabb::from_corner(9.0, 9.0, 10.0, 10.0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&crossing));
        assert!(crossing.overlaps(&a));
    }

    #[test]
    fn test_center_and_extents() {
        let b = Aabb::from_center(Vec2::new(50.0, 20.0), Vec2::new(21.0, 8.0));
        assert_eq!(b.min, Vec2::new(29.0, 12.0));
        assert_eq!(b.width(), 42.0);
        assert_eq!(b.height(), 16.0);
        assert_eq!(b.center(), Vec2::new(50.0, 20.0));
        assert!(b.contains_point(Vec2::new(29.0, 12.0)));
        assert!(!b.contains_point(Vec2::new(28.9, 12.0)));
    }
}
