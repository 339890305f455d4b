// geometry.rs
use bevy::math::bounding::{Aabb2d, IntersectsVolume};
use bevy::prelude::*;

/// Axis-aligned overlap test used for every collision and perception query.
///
/// Intervals are closed, so boxes that share an edge overlap. Resolution code
/// always pushes an extra [`crate::physics::EDGE_EPSILON`] past the edge, which
/// keeps a corrected box from re-triggering on the next query.
pub fn has_collision(a: &Rect, b: &Rect) -> bool {
    to_aabb(a).intersects(&to_aabb(b))
}

fn to_aabb(r: &Rect) -> Aabb2d {
    Aabb2d {
        min: r.min,
        max: r.max,
    }
}

/// Builds a screen-space box from its top-left corner and size.
pub fn rect_at(corner: Vec2, size: Vec2) -> Rect {
    Rect::from_corners(corner, corner + size)
}

/// One static piece of level geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionBlock {
    pub rect: Rect,
}

impl CollisionBlock {
    pub const SIZE: f32 = 16.0;

    pub fn new(corner: Vec2, size: Vec2) -> Self {
        Self {
            rect: rect_at(corner, size),
        }
    }

    /// A standard 16 × 16 tile block.
    pub fn tile(corner: Vec2) -> Self {
        Self::new(corner, Vec2::splat(Self::SIZE))
    }

    pub fn left(&self) -> f32 {
        self.rect.min.x
    }
    pub fn right(&self) -> f32 {
        self.rect.max.x
    }
    pub fn top(&self) -> f32 {
        self.rect.min.y
    }
    pub fn bottom(&self) -> f32 {
        self.rect.max.y
    }
}
